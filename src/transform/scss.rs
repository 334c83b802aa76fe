//! SCSS compilation via `grass`.

use std::path::{Path, PathBuf};

use grass::{Options, OutputStyle};

use crate::pipeline::BuildError;

/// Compile SCSS read from `path` to expanded CSS.
///
/// `@use`/`@import` resolve against the file's own directory first, then
/// each of `load_paths`.
pub fn compile_scss(path: &Path, source: &str, load_paths: &[PathBuf]) -> Result<String, BuildError> {
    let mut options = Options::default().style(OutputStyle::Expanded);
    if let Some(dir) = path.parent() {
        options = options.load_path(dir);
    }
    for dir in load_paths {
        options = options.load_path(dir);
    }

    grass::from_string(source, &options).map_err(|err| BuildError::syntax(path, err.to_string()))
}
