//! # Output Formatting
//!
//! Commands produce structured data; this module decides how it reaches
//! stdout.
//!
//! - **text**: headings, colored counts and an indented path tree
//! - **json**: pretty-printed JSON, the analysis record or a command report
//!
//! Logs and progress bars always go to stderr so that stdout stays parseable.

pub mod progress;
pub mod render;
pub mod shapes;

/// Output format for command results.
///
/// ```bash
/// sitepeek analyze example.com
/// sitepeek analyze example.com --format json | jq '.fonts'
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty text output (default)
    #[default]
    Text,
    /// Single pretty-printed JSON document
    Json,
}
