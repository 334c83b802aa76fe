//! `[watch]` section configuration.
//!
//! ```toml
//! [watch]
//! debounce_ms = 300      # quiet period before a change set is dispatched
//! initial_build = true   # run every pipeline once before watching
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WatchConfig {
    pub debounce_ms: u64,
    pub initial_build: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            initial_build: true,
        }
    }
}
