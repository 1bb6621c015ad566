//! # CLI Structure and Argument Parsing
//!
//! `sitepeek` exposes the three core operations as subcommands:
//!
//! ```bash
//! # Inventory a page
//! sitepeek analyze https://example.com
//! sitepeek analyze example.com --format json | jq '.summary'
//!
//! # Download one asset
//! sitepeek fetch https://example.com/logo.png -o logo.png
//!
//! # Bundle the page and a capped set of its assets
//! sitepeek bundle https://example.com --image-cap 10
//! ```
//!
//! Global flags (`--verbose`, `--quiet`, `--no-color`, `--config`) apply to
//! every subcommand.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

/// Default archive name for `sitepeek bundle`.
pub const DEFAULT_BUNDLE_PATH: &str = "website_assets.zip";

/// Main CLI structure for the `sitepeek` command
#[derive(Parser, Clone, Debug)]
#[command(name = "sitepeek")]
#[command(version)]
#[command(about = "Inspect a web page's assets, colors and fonts, and bundle them into a zip")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable colored output (also honors NO_COLOR)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, env = "SITEPEEK_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Fetch a page and list its assets, colors, fonts and path structure
    Analyze(AnalyzeArgs),

    /// Download a single asset
    Fetch(FetchArgs),

    /// Download the page and a capped set of its assets into a zip archive
    Bundle(BundleArgs),
}

impl Commands {
    /// Output format requested by the selected subcommand.
    pub const fn format(&self) -> OutputFormat {
        match self {
            Self::Analyze(args) => args.format,
            Self::Fetch(args) => args.format,
            Self::Bundle(args) => args.format,
        }
    }
}

/// Arguments for `sitepeek analyze`
#[derive(Args, Clone, Debug)]
pub struct AnalyzeArgs {
    /// Page URL; a bare host gets `https://`
    pub url: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Only scan inline styles; do not fetch stylesheets for colors and fonts
    #[arg(long)]
    pub no_enrich: bool,

    /// Number of colors to show in text output (overrides `analysis.palette_size`)
    #[arg(long, value_name = "N")]
    pub palette: Option<usize>,
}

/// Arguments for `sitepeek fetch`
#[derive(Args, Clone, Debug)]
pub struct FetchArgs {
    /// Asset URL
    pub url: String,

    /// Where to write the asset; `-` for stdout. Defaults to the URL's file name
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Attempts for transient failures (connect errors, timeouts, 429, 5xx)
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub retries: u32,

    /// Output format for the download summary
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for `sitepeek bundle`
#[derive(Args, Clone, Debug)]
pub struct BundleArgs {
    /// Page URL; a bare host gets `https://`
    pub url: String,

    /// Archive path
    #[arg(short = 'o', long, value_name = "PATH", default_value = DEFAULT_BUNDLE_PATH)]
    pub output: PathBuf,

    /// Maximum stylesheets to include
    #[arg(long, value_name = "N")]
    pub css_cap: Option<usize>,

    /// Maximum scripts to include
    #[arg(long, value_name = "N")]
    pub js_cap: Option<usize>,

    /// Maximum images to include
    #[arg(long, value_name = "N")]
    pub image_cap: Option<usize>,

    /// Maximum other files to include
    #[arg(long, value_name = "N")]
    pub other_cap: Option<usize>,

    /// Concurrent asset downloads (1-32)
    #[arg(short = 'j', long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Output format for the bundle report
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}
