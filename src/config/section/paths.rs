//! `[paths]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [paths]
//! app = "app"                   # Source root
//! dist = "dist"                 # Development output root
//! prod = "prod"                 # Production output root
//! node_modules = "node_modules" # Dependency store for vendored modules
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project directory layout, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub app: PathBuf,
    pub dist: PathBuf,
    pub prod: PathBuf,
    pub node_modules: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            app: PathBuf::from("app"),
            dist: PathBuf::from("dist"),
            prod: PathBuf::from("prod"),
            node_modules: PathBuf::from("node_modules"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::Path;

    #[test]
    fn test_paths_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.paths.app, Path::new("app"));
        assert_eq!(config.paths.dist, Path::new("dist"));
        assert_eq!(config.paths.prod, Path::new("prod"));
    }

    #[test]
    fn test_paths_override() {
        let config = test_parse_config("[paths]\ndist = \"build\"");
        assert_eq!(config.paths.dist, Path::new("build"));
        assert_eq!(config.paths.prod, Path::new("prod"));
    }
}
