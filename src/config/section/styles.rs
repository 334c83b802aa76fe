//! `[styles]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [styles.targets]
//! chrome = "80"
//! safari = "13.1"
//!
//! [[styles.fonts]]
//! family = "Montserrat"
//! url = "/fonts"
//! display = "swap"
//! variants = { "300" = ["woff2", "woff", "eot"], "400 italic" = ["woff2"] }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Style pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Browser targets used for vendor prefixing.
    pub targets: TargetsConfig,

    /// Font families to declare with `@font-face` when referenced.
    pub fonts: Vec<FontConfig>,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            targets: default_targets(),
            fonts: vec![FontConfig::montserrat()],
        }
    }
}

/// Browsers lightningcss can prefix for.
pub const KNOWN_BROWSERS: &[&str] = &[
    "android", "chrome", "edge", "firefox", "ie", "ios_saf", "opera", "safari", "samsung",
];

/// Minimum browser versions (`"major"` or `"major.minor"`), keyed by browser.
///
/// Declaring the table replaces the defaults entirely.
pub type TargetsConfig = BTreeMap<String, String>;

fn default_targets() -> TargetsConfig {
    [
        ("chrome", "80"),
        ("edge", "88"),
        ("firefox", "78"),
        ("safari", "13"),
        ("ios_saf", "13"),
        ("samsung", "12"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// A self-hosted font family.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FontConfig {
    /// Family name as used in `font-family` declarations.
    pub family: String,

    /// URL directory the font files are served from.
    #[serde(default = "default_font_url")]
    pub url: String,

    /// `font-display` descriptor.
    #[serde(default = "default_font_display")]
    pub display: String,

    /// Variant (`"400"`, `"300 italic"`) → file formats.
    #[serde(default)]
    pub variants: BTreeMap<String, Vec<String>>,
}

fn default_font_url() -> String {
    "/fonts".into()
}

fn default_font_display() -> String {
    "swap".into()
}

impl FontConfig {
    /// The stock Montserrat declaration shipped as the default.
    pub fn montserrat() -> Self {
        let mut variants = BTreeMap::new();
        variants.insert(
            "300".to_string(),
            vec!["woff2".to_string(), "woff".to_string(), "eot".to_string()],
        );
        variants.insert("400 italic".to_string(), vec!["woff2".to_string()]);
        Self {
            family: "Montserrat".into(),
            url: default_font_url(),
            display: default_font_display(),
            variants,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_fonts_from_toml() {
        let config = test_parse_config(
            r#"
[[styles.fonts]]
family = "Inter"
variants = { "400" = ["woff2"] }
"#,
        );
        let font = &config.styles.fonts[0];
        assert_eq!(font.family, "Inter");
        assert_eq!(font.url, "/fonts");
        assert_eq!(font.display, "swap");
        assert_eq!(font.variants["400"], vec!["woff2"]);
    }

    #[test]
    fn test_default_declares_montserrat() {
        let config = test_parse_config("");
        assert_eq!(config.styles.fonts.len(), 1);
        assert_eq!(config.styles.fonts[0].family, "Montserrat");
    }

    #[test]
    fn test_targets_table_replaces_defaults() {
        let config = test_parse_config("[styles.targets]\nchrome = \"90\"");
        assert_eq!(config.styles.targets.len(), 1);
        assert_eq!(config.styles.targets["chrome"], "90");
    }
}
