//! `[vendor]` section configuration.
//!
//! ```toml
//! [vendor]
//! modules = ["imask/dist/imask.min.js"]  # relative to paths.node_modules
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VendorConfig {
    pub modules: Vec<PathBuf>,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            modules: vec![PathBuf::from("imask/dist/imask.min.js")],
        }
    }
}
