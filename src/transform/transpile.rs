//! Down-level script transpilation via `oxc`.

use std::path::{Path, PathBuf};

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions};
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{TransformOptions, Transformer};

use crate::pipeline::BuildError;

const STAGE: &str = "transpile";

/// Transpiled script and its optional source map (JSON).
#[derive(Debug)]
pub struct Transpiled {
    pub code: String,
    pub map: Option<String>,
}

/// Lower `source` to the ECMAScript level named by `target` (e.g. `es2015`).
///
/// The map names its source by file name only and embeds the source text,
/// so it never carries build machine paths.
pub fn transpile(
    path: &Path,
    source: &str,
    target: &str,
    source_map: bool,
) -> Result<Transpiled, BuildError> {
    let options =
        TransformOptions::from_target(target).map_err(|err| BuildError::tool(STAGE, path, err))?;

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if let Some(err) = ret.errors.first() {
        return Err(BuildError::tool(STAGE, path, err));
    }
    let mut program = ret.program;

    let scoping = SemanticBuilder::new().build(&program).semantic.into_scoping();
    let ret = Transformer::new(&allocator, path, &options).build_with_scoping(scoping, &mut program);
    if let Some(err) = ret.errors.first() {
        return Err(BuildError::tool(STAGE, path, err));
    }

    let ret = Codegen::new()
        .with_options(CodegenOptions {
            source_map_path: source_map
                .then(|| PathBuf::from(path.file_name().unwrap_or(path.as_os_str()))),
            ..CodegenOptions::default()
        })
        .build(&program);

    Ok(Transpiled {
        code: ret.code,
        map: ret.map.map(|map| map.to_json_string()),
    })
}
