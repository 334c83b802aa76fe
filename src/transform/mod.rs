//! Content transforms wrapped by the pipeline stages.
//!
//! Each transform is a plain function over one file's content. Failures are
//! reported as [`BuildError`](crate::pipeline::BuildError) naming the file.

mod beautify;
mod image;
mod include;
mod minify;
mod postcss;
mod scss;
mod transpile;

pub use beautify::beautify_html;
pub use image::compress_image;
pub use include::resolve_includes;
pub use minify::{min_path, minify_css, minify_js};
pub use postcss::{browsers_from_targets, inject_font_faces, process_css};
pub use scss::compile_scss;
pub use transpile::transpile;
