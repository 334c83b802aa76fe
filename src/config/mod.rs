//! Project configuration management for `stagecraft.toml`.
//!
//! The config file is optional: without one, the built-in defaults describe
//! the conventional `app/` → `dist/` | `prod/` layout.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[paths]`   | Source root, output roots, dependency store      |
//! | `[styles]`  | Browser targets, self-hosted fonts               |
//! | `[scripts]` | Transpile target, source maps                    |
//! | `[images]`  | Compression levels                               |
//! | `[vendor]`  | Allow-list of pre-built third-party files        |
//! | `[serve]`   | Development server (interface, ports)            |
//! | `[watch]`   | Debounce, initial build                          |

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{
    FontConfig, ImagesConfig, PathsConfig, ScriptsConfig, ServeConfig, StylesConfig,
    VendorConfig, WatchConfig,
};

use crate::log;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use util::find_config_file;
pub use util::parse_browser_version;

/// Root configuration structure representing stagecraft.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    /// Absolute path to the config file, empty when running on defaults
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file, or cwd
    #[serde(skip)]
    pub root: PathBuf,

    pub paths: PathsConfig,
    pub styles: StylesConfig,
    pub scripts: ScriptsConfig,
    pub images: ImagesConfig,
    pub vendor: VendorConfig,
    pub serve: ServeConfig,
    pub watch: WatchConfig,
}

impl SiteConfig {
    /// Load configuration for the given config file name.
    ///
    /// Searches upward from cwd. The project root is the config file's
    /// directory, or cwd when no config file exists.
    pub fn load(config_name: &Path) -> Result<Self> {
        let mut config = match find_config_file(config_name) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                config.config_path = path;
                crate::debug!("config"; "using {}", config.config_path.display());
                config
            }
            None => {
                crate::debug!("config"; "{} not found, using defaults", config_name.display());
                let cwd =
                    std::env::current_dir().context("Failed to get current working directory")?;
                Self::for_root(&cwd)
            }
        };

        if config.root.as_os_str().is_empty() {
            config.root = std::env::current_dir()?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Default configuration rooted at `root`.
    pub fn for_root(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            ..Self::default()
        }
    }

    /// Parse configuration from TOML string
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            let display_path = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy());
            log!("warning"; "ignoring unknown fields in {}: {}", display_path, ignored.join(", "));
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Get path relative to the project root, for display.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Validate values that serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dist = normalize_lexically(&self.paths.dist);
        let prod = normalize_lexically(&self.paths.prod);
        if dist.as_os_str().is_empty() || prod.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "paths.dist and paths.prod must not be the project root".into(),
            ));
        }
        if dist.starts_with(&prod) || prod.starts_with(&dist) {
            return Err(ConfigError::Validation(format!(
                "paths.dist (`{}`) and paths.prod (`{}`) must be distinct, non-nested directories",
                self.paths.dist.display(),
                self.paths.prod.display()
            )));
        }

        if !(1..=100).contains(&self.images.jpeg_quality) {
            return Err(ConfigError::Validation(format!(
                "images.jpeg_quality must be within 1..=100, got {}",
                self.images.jpeg_quality
            )));
        }
        if !(2..=256).contains(&self.images.png_levels) {
            return Err(ConfigError::Validation(format!(
                "images.png_levels must be within 2..=256, got {}",
                self.images.png_levels
            )));
        }

        if let Err(err) = oxc::transformer::TransformOptions::from_target(&self.scripts.target) {
            return Err(ConfigError::Validation(format!(
                "scripts.target `{}`: {err}",
                self.scripts.target
            )));
        }

        for (browser, version) in &self.styles.targets {
            if !section::KNOWN_BROWSERS.contains(&browser.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "styles.targets: unknown browser `{browser}`"
                )));
            }
            if parse_browser_version(version).is_none() {
                return Err(ConfigError::Validation(format!(
                    "styles.targets.{browser}: invalid version `{version}`"
                )));
            }
        }

        Ok(())
    }
}

/// Drop `.` components and trailing separators so `./dist/` equals `dist`.
fn normalize_lexically(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}

/// Parse a config snippet for tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    SiteConfig::from_str(content).expect("config should parse")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (config, ignored) =
            SiteConfig::parse_with_ignored("[paths]\ndist = \"out\"\nbogus = 1\n").unwrap();
        assert_eq!(config.paths.dist, Path::new("out"));
        assert_eq!(ignored, vec!["paths.bogus".to_string()]);
    }

    #[test]
    fn test_same_output_roots_rejected() {
        let config = test_parse_config("[paths]\ndist = \"out\"\nprod = \"./out/\"");
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_nested_output_roots_rejected() {
        let config = test_parse_config("[paths]\ndist = \"out\"\nprod = \"out/prod\"");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_root_as_output_rejected() {
        let config = test_parse_config("[paths]\ndist = \".\"");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_image_bounds() {
        let config = test_parse_config("[images]\njpeg_quality = 0");
        assert!(config.validate().is_err());
        let config = test_parse_config("[images]\npng_levels = 1");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_target_rejected() {
        let config = test_parse_config("[styles.targets]\nnetscape = \"4\"");
        assert!(config.validate().is_err());
        let config = test_parse_config("[styles.targets]\nchrome = \"latest\"");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_script_target_rejected() {
        let config = test_parse_config("[scripts]\ntarget = \"es1999\"");
        assert!(config.validate().is_err());
        let config = test_parse_config("[scripts]\ntarget = \"es2017\"");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_root_relative() {
        let config = SiteConfig::for_root(Path::new("/site"));
        assert_eq!(
            config.root_relative("/site/app/index.html"),
            Path::new("app/index.html")
        );
        assert_eq!(config.root_relative("/elsewhere/x"), Path::new("/elsewhere/x"));
    }
}
