//! Configuration section definitions.

mod images;
mod paths;
mod scripts;
mod serve;
mod styles;
mod vendor;
mod watch;

pub use images::ImagesConfig;
pub use paths::PathsConfig;
pub use scripts::ScriptsConfig;
pub use serve::ServeConfig;
pub use styles::{FontConfig, KNOWN_BROWSERS, StylesConfig};
pub use vendor::VendorConfig;
pub use watch::WatchConfig;
