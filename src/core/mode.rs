//! Build mode configuration for production/development builds.

/// Build mode, decided once per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    #[default]
    Development,
    Production,
}

impl BuildMode {
    /// Map the `--prod` flag to a mode.
    pub const fn from_flag(production: bool) -> Self {
        if production {
            Self::Production
        } else {
            Self::Development
        }
    }

    #[inline]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Options threaded into every pipeline constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildOptions {
    pub mode: BuildMode,
    /// Emit `.min.js` next to each script (`--min`).
    pub minify_scripts: bool,
}

impl BuildOptions {
    pub const fn new(mode: BuildMode, minify_scripts: bool) -> Self {
        Self {
            mode,
            minify_scripts,
        }
    }
}
