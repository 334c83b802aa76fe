//! Watch mode: initial build, dev server, rebuild on change.

use crate::{
    actor::Coordinator, cli::serve, config::SiteConfig, core::BuildOptions, paths::PathTable,
};
use anyhow::{Context, Result};
use std::sync::Arc;

/// `stagecraft watch`: blocks until Ctrl+C.
pub fn watch(config: SiteConfig, options: BuildOptions) -> Result<()> {
    let paths = PathTable::from_config(&config).context("Invalid source glob")?;
    let serve_root = paths.output_root(options.mode).to_path_buf();

    let server = serve::bind_server(&config, serve_root)?;
    let coordinator = Coordinator::new(Arc::new(config), Arc::new(paths), options);
    server.run(coordinator)
}
