//! Pipeline error taxonomy.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure of one pipeline stage on one file.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Malformed source. Style pipelines log these and skip the file.
    #[error("{}: {message}", path.display())]
    Syntax { path: PathBuf, message: String },

    #[error("I/O error on `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external transformer (transpiler, minifier, encoder) gave up.
    #[error("{stage} failed on `{}`: {message}", path.display())]
    Tool {
        stage: &'static str,
        path: PathBuf,
        message: String,
    },
}

impl BuildError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn syntax(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Syntax {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn tool(stage: &'static str, path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Tool {
            stage,
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Syntax { path, .. } | Self::Io { path, .. } | Self::Tool { path, .. } => path,
        }
    }
}
