//! `[scripts]` section configuration.
//!
//! ```toml
//! [scripts]
//! target = "es2015"   # ECMAScript level scripts are lowered to
//! source_maps = true  # Write `<name>.js.map` next to each script
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScriptsConfig {
    pub target: String,
    pub source_maps: bool,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            target: "es2015".into(),
            source_maps: true,
        }
    }
}
