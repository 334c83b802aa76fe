//! Per-kind asset pipelines.
//!
//! # Architecture
//!
//! ```text
//!            ┌──────────────── StageChain ────────────────┐
//! source ──▶ │ include ─▶ transform ─▶ rewrite (prod only) │ ──▶ write ──▶ .min ──▶ notify
//!            └─────────────────────────────────────────────┘
//! ```
//!
//! | Kind    | Stages                                               | `.min`          |
//! |---------|------------------------------------------------------|-----------------|
//! | markup  | include, beautify, rewrite                           | never           |
//! | styles  | scss, fonts, prefix + media, rewrite                 | always          |
//! | scripts | include, rewrite, transpile                          | with `--min`    |
//! | images  | mtime gate, recompress                               | -               |
//!
//! Every pipeline is built from an explicit [`BuildOptions`]; nothing reads
//! the mode from global state. Style files with syntax errors are logged
//! and skipped, every other failure ends the run.

mod clean;
mod error;
mod images;
mod markup;
mod notify;
mod rewrite;
mod scripts;
mod stage;
mod styles;
mod text;
mod vendor;

pub use clean::clean;
pub use error::BuildError;
pub use images::ImagePipeline;
pub use notify::LiveReload;
pub use rewrite::Rewrite;
pub use stage::{Asset, FnStage, Stage, StageChain};
pub use text::TextPipeline;
pub use vendor::VendorCopy;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::core::{AssetKind, BuildOptions};
use crate::paths::PathTable;

/// A named, independently runnable unit of the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Asset(AssetKind),
    Vendor,
}

impl Task {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Asset(kind) => kind.name(),
            Self::Vendor => "vendor",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub task: Task,
    /// Files written, including `.map` and `.min` siblings.
    pub written: Vec<PathBuf>,
    /// Sources not written: up-to-date images, style files with syntax errors.
    pub skipped: Vec<PathBuf>,
}

impl RunReport {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            written: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        if self.skipped.is_empty() {
            format!("{}: {} written", self.task, self.written.len())
        } else {
            format!(
                "{}: {} written, {} skipped",
                self.task,
                self.written.len(),
                self.skipped.len()
            )
        }
    }
}

/// Pipeline for one asset kind.
pub enum Pipeline {
    Text(TextPipeline),
    Images(ImagePipeline),
}

impl Pipeline {
    pub fn for_kind(
        kind: AssetKind,
        config: &SiteConfig,
        paths: &PathTable,
        options: BuildOptions,
    ) -> Self {
        match kind {
            AssetKind::Markup => Self::Text(markup::pipeline(paths, options)),
            AssetKind::Styles => Self::Text(styles::pipeline(config, paths, options)),
            AssetKind::Scripts => Self::Text(scripts::pipeline(config, paths, options)),
            AssetKind::Images => Self::Images(ImagePipeline::new(config, paths, options)),
        }
    }

    pub async fn run(&self, reload: &LiveReload) -> Result<RunReport, BuildError> {
        match self {
            Self::Text(pipeline) => pipeline.run(reload).await,
            Self::Images(pipeline) => pipeline.run(reload).await,
        }
    }
}

/// Write `bytes` to `path`, creating parent directories.
pub(crate) async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| BuildError::io(parent, err))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .map_err(|err| BuildError::io(path, err))
}
