//! Logging initialization and configuration.
//!
//! Sets up the tracing subscriber and color control from CLI flags and the
//! environment.

use anyhow::Result;
use colored::control as color_control;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::cli::Cli;
use crate::output::OutputFormat;

/// Pick the log level for a parsed command line.
///
/// Machine-readable output keeps stderr down to errors unless `--verbose`
/// was given explicitly.
pub const fn log_level(cli: &Cli) -> Level {
    if cli.verbose {
        Level::DEBUG
    } else if cli.quiet || matches!(cli.command.format(), OutputFormat::Json) {
        Level::ERROR
    } else {
        Level::WARN
    }
}

/// Initialize the logging subsystem based on CLI flags.
///
/// # Errors
///
/// Returns an error if the global tracing subscriber cannot be set.
pub fn initialize_logging(cli: &Cli) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(cli))
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Color control: disable when requested, NO_COLOR is set, or when emitting machine output
    let env_no_color = std::env::var("NO_COLOR").ok().is_some();
    let machine_output = matches!(cli.command.format(), OutputFormat::Json);
    if cli.no_color || env_no_color || machine_output {
        color_control::set_override(false);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_default_level_is_warn() {
        assert_eq!(log_level(&parse(&["sitepeek", "analyze", "a.com"])), Level::WARN);
    }

    #[test]
    fn test_verbose_and_quiet() {
        assert_eq!(
            log_level(&parse(&["sitepeek", "-v", "bundle", "a.com"])),
            Level::DEBUG
        );
        assert_eq!(
            log_level(&parse(&["sitepeek", "-q", "bundle", "a.com"])),
            Level::ERROR
        );
    }

    #[test]
    fn test_json_output_suppresses_warnings() {
        assert_eq!(
            log_level(&parse(&["sitepeek", "analyze", "a.com", "-f", "json"])),
            Level::ERROR
        );
        // An explicit --verbose still wins
        assert_eq!(
            log_level(&parse(&["sitepeek", "-v", "analyze", "a.com", "-f", "json"])),
            Level::DEBUG
        );
    }
}
