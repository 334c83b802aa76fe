//! Core types - pure abstractions shared across the codebase.

mod kind;
mod mode;
mod state;

pub use kind::AssetKind;
pub use mode::{BuildMode, BuildOptions};
pub use state::{is_shutdown, register_server, setup_shutdown_handler};
