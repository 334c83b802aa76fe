//! `[images]` section configuration.
//!
//! ```toml
//! [images]
//! jpeg_quality = 80   # 1-100
//! png_levels = 64     # levels per colour channel, 256 keeps PNGs lossless
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImagesConfig {
    pub jpeg_quality: u8,
    pub png_levels: u16,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 80,
            png_levels: 64,
        }
    }
}
