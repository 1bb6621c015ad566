//! sitepeek CLI - inspect and bundle a web page's assets
//!
//! The binary in `main.rs` is a thin wrapper around [`run`]; command
//! implementations live in separate modules.

use anyhow::Result;
use clap::Parser;
use sitepeek_core::Config;
use tracing::debug;

mod cli;
mod commands;
pub mod error;
mod output;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::utils::initialize_logging;

/// Execute the sitepeek CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns an error if configuration loading or command execution fails.
/// Use [`error::exit_code_from_error`] to pick the process exit code.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    initialize_logging(&cli)?;

    let config = load_config(&cli).map_err(CliError::usage)?;
    debug!("Loaded configuration: {config:?}");

    match &cli.command {
        Commands::Analyze(args) => commands::analyze(args, config, cli.quiet).await,
        Commands::Fetch(args) => commands::fetch(args, config, cli.quiet).await,
        Commands::Bundle(args) => commands::bundle(args, config, cli.quiet).await,
    }
}

/// Config file (explicit `--config`, else the platform default), then
/// `SITEPEEK_*` environment overrides.
fn load_config(cli: &Cli) -> sitepeek_core::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env()?;
    Ok(config)
}
