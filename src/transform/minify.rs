//! Minification of the `.min` artifacts.
//!
//! Uses oxc for JavaScript and lightningcss for CSS.

use std::path::Path;

use lightningcss::stylesheet::{MinifyOptions, PrinterOptions};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::postcss::parse_recovering;
use crate::pipeline::BuildError;

const STAGE: &str = "minify";

/// Minify JavaScript source code.
pub fn minify_js(path: &Path, source: &str) -> Result<String, BuildError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if let Some(err) = ret.errors.first() {
        return Err(BuildError::tool(STAGE, path, err));
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify CSS source code.
pub fn minify_css(path: &Path, source: &str) -> Result<String, BuildError> {
    let mut stylesheet =
        parse_recovering(path, source).map_err(|err| BuildError::tool(STAGE, path, err))?;
    stylesheet
        .minify(MinifyOptions::default())
        .map_err(|err| BuildError::tool(STAGE, path, err))?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|err| BuildError::tool(STAGE, path, err))?;
    Ok(result.code)
}

/// Path of the minified sibling: `app.css` → `app.min.css`.
pub fn min_path(path: &Path) -> std::path::PathBuf {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let name = match path.extension() {
        Some(ext) => format!("{stem}.min.{}", ext.to_string_lossy()),
        None => format!("{stem}.min"),
    };
    path.with_file_name(name)
}
