//! CLI error handling with semantic exit codes.
//!
//! | Code | Category | Description |
//! |------|----------|-------------|
//! | 0 | Success | Command completed successfully |
//! | 1 | `Internal` | Unexpected/internal error |
//! | 2 | `Usage` | Invalid arguments, URL or configuration |
//! | 5 | `Network` | Page unreachable or returned an error status |
//! | 6 | `Timeout` | Page fetch or analysis timed out |
//! | 7 | `UnsupportedContent` | Page is not HTML, or exceeds the size limit |
//!
//! ```bash
//! sitepeek analyze example.com --format json > out.json
//! case $? in
//!     0) echo "ok" ;;
//!     5) echo "site is down" ;;
//!     7) echo "not a web page" ;;
//! esac
//! ```
//!
//! Errors raised by `sitepeek-core` are categorized from their variant;
//! anything else falls back to message inspection.

use std::fmt;

use sitepeek_core::FetchErrorKind;

/// Semantic error category determining the exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Unexpected or internal error (exit code 1).
    Internal = 1,

    /// Invalid arguments, URL or configuration (exit code 2).
    Usage = 2,

    /// Network or fetch failure (exit code 5).
    ///
    /// DNS and connect failures as well as non-2xx statuses.
    Network = 5,

    /// Operation timed out (exit code 6).
    Timeout = 6,

    /// The response cannot be analyzed (exit code 7).
    ///
    /// The page is not HTML or its body exceeded the byte ceiling.
    UnsupportedContent = 7,
}

impl ErrorCategory {
    /// Get the exit code for this category.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        self as u8
    }

    /// Get a short description of this error category.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Internal => "internal error",
            Self::Usage => "usage error",
            Self::Network => "network error",
            Self::Timeout => "timeout",
            Self::UnsupportedContent => "unsupported content",
        }
    }

    /// Categorize a core error by its variant.
    #[must_use]
    pub fn from_core(err: &sitepeek_core::Error) -> Self {
        match err.fetch_kind() {
            Some(FetchErrorKind::Timeout) => return Self::Timeout,
            Some(FetchErrorKind::TooLarge) => return Self::UnsupportedContent,
            Some(FetchErrorKind::Unreachable | FetchErrorKind::HttpStatus) => return Self::Network,
            None => {},
        }

        match err.category() {
            "invalid_url" | "invalid_reference" | "config" => Self::Usage,
            "fetch" => Self::Network,
            "timeout" => Self::Timeout,
            "content_type" => Self::UnsupportedContent,
            _ => Self::Internal,
        }
    }

    /// Infer the error category from an error message.
    ///
    /// Heuristic fallback for errors that did not come from `sitepeek-core`.
    #[must_use]
    pub fn infer_from_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        // Timeout first so "connection timed out" is not a plain network error
        if msg_lower.contains("timeout") || msg_lower.contains("timed out") {
            return Self::Timeout;
        }

        if msg_lower.contains("network")
            || msg_lower.contains("connection")
            || msg_lower.contains("dns")
            || msg_lower.contains("http")
            || msg_lower.contains("unreachable")
        {
            return Self::Network;
        }

        if msg_lower.contains("content type") || msg_lower.contains("not html") {
            return Self::UnsupportedContent;
        }

        if msg_lower.contains("invalid argument")
            || msg_lower.contains("invalid url")
            || msg_lower.contains("invalid value")
            || msg_lower.contains("config")
        {
            return Self::Usage;
        }

        Self::Internal
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A CLI error with a semantic category for exit code mapping.
///
/// Wraps an `anyhow::Error` so context chains survive while the exit code
/// stays explicit.
#[derive(Debug)]
pub struct CliError {
    /// The semantic category of this error.
    pub category: ErrorCategory,
    /// The underlying error with full context.
    pub source: anyhow::Error,
}

impl CliError {
    /// Create a usage error.
    pub fn usage(source: impl Into<anyhow::Error>) -> Self {
        Self {
            category: ErrorCategory::Usage,
            source: source.into(),
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.category.exit_code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

// Display already shows the wrapped error, so the chain continues at its cause
impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.source()
    }
}

/// Determine the exit code from an `anyhow::Error`.
///
/// An explicit [`CliError`] wins; otherwise the first `sitepeek-core` error
/// in the chain decides, and the message is the last resort.
#[must_use]
pub fn exit_code_from_error(err: &anyhow::Error) -> u8 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }

    if let Some(core_err) = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<sitepeek_core::Error>())
    {
        return ErrorCategory::from_core(core_err).exit_code();
    }

    ErrorCategory::infer_from_message(&err.to_string()).exit_code()
}
