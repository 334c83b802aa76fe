//! Stagecraft - asset pipelines for static sites.

mod actor;
mod cli;
mod config;
mod core;
mod embed;
mod freshness;
mod logger;
mod paths;
mod pipeline;
mod reload;
mod transform;
mod utils;

use anyhow::Result;
use clap::ColorChoice;
use cli::{Cli, Commands};
use config::SiteConfig;
use core::{BuildMode, BuildOptions};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let (cli, dropped) = Cli::parse_lenient(std::env::args_os());

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);
    if !dropped.is_empty() {
        debug!("cli"; "ignoring unknown arguments: {}", dropped.join(" "));
    }

    let config = SiteConfig::load(&cli.config)?;
    let options = BuildOptions::new(BuildMode::from_flag(cli.prod), cli.min);

    match cli.action() {
        Commands::Build => cli::build::build(&config, options),
        Commands::Watch => cli::watch::watch(config, options),
        Commands::Clean => cli::build::clean(&config, options),
        Commands::Run { task } => cli::build::run_task(&config, options, task.into()),
    }
}
