//! Error types and handling for sitepeek-core operations.
//!
//! Two layers of errors exist:
//!
//! - [`FetchError`] describes why a single outbound GET failed. It is produced by
//!   every [`PageFetcher`](crate::PageFetcher) and is either fatal (the page fetch
//!   of an analysis) or skipped (stylesheet enrichment, bundle assets).
//! - [`Error`] is what the public operations return. A failed page fetch is
//!   surfaced as [`Error::Fetch`] so callers can tell "site unreachable" from
//!   "site returned an error status" from "response too large".
//!
//! ## Error Categories
//!
//! - **Reference**: a raw attribute value could not be resolved to an asset URL
//! - **Fetch**: network failures, timeouts, size ceilings, non-2xx statuses
//! - **Content type**: the page was not HTML
//! - **Analysis**: a bundle could not start because its analysis failed
//! - **Archive**: the bundle archive could not be written
//! - **Configuration**: invalid settings or unreadable config files
//!
//! ```rust
//! use sitepeek_core::{Error, FetchError, FetchErrorKind};
//!
//! let err = Error::from(FetchError::HttpStatus {
//!     url: "https://example.com/".to_string(),
//!     status: 503,
//! });
//! assert_eq!(err.category(), "fetch");
//! assert_eq!(err.fetch_kind(), Some(FetchErrorKind::HttpStatus));
//! assert!(err.is_recoverable());
//! ```

use std::time::Duration;

use thiserror::Error;

/// Why a single outbound fetch failed.
///
/// The fetcher never retries; the variant tells the caller enough to decide
/// whether a retry makes sense (see [`FetchError::is_recoverable`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The host could not be reached (DNS, connect, TLS, reset, redirect loop).
    #[error("could not reach '{url}': {reason}")]
    Unreachable {
        /// Requested URL.
        url: String,
        /// Transport-level description of the failure.
        reason: String,
    },

    /// No complete response arrived within the allowed time.
    #[error("request to '{url}' timed out after {}s", after.as_secs_f32())]
    Timeout {
        /// Requested URL.
        url: String,
        /// The timeout that expired.
        after: Duration,
    },

    /// The response body exceeded the byte ceiling and was abandoned.
    #[error("response from '{url}' exceeds the {limit} byte limit")]
    TooLarge {
        /// Requested URL.
        url: String,
        /// Byte ceiling that was exceeded.
        limit: usize,
    },

    /// The server answered with a non-2xx status.
    #[error("'{url}' returned HTTP {status}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// Status code returned by the server.
        status: u16,
    },
}

/// Discriminant of a [`FetchError`], for callers that render one message per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// See [`FetchError::Unreachable`].
    Unreachable,
    /// See [`FetchError::Timeout`].
    Timeout,
    /// See [`FetchError::TooLarge`].
    TooLarge,
    /// See [`FetchError::HttpStatus`].
    HttpStatus,
}

impl FetchError {
    /// The kind of failure without its payload.
    #[must_use]
    pub const fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Unreachable { .. } => FetchErrorKind::Unreachable,
            Self::Timeout { .. } => FetchErrorKind::Timeout,
            Self::TooLarge { .. } => FetchErrorKind::TooLarge,
            Self::HttpStatus { .. } => FetchErrorKind::HttpStatus,
        }
    }

    /// The URL whose fetch failed.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Unreachable { url, .. }
            | Self::Timeout { url, .. }
            | Self::TooLarge { url, .. }
            | Self::HttpStatus { url, .. } => url,
        }
    }

    /// Whether retrying the same request later might succeed.
    ///
    /// Connection failures, timeouts, `429` and `5xx` are transient. A body that
    /// is too large or a `4xx` status will not change on retry.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Unreachable { .. } | Self::Timeout { .. } => true,
            Self::TooLarge { .. } => false,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

/// The main error type for sitepeek-core operations.
///
/// All public operations return `Result<T, Error>`. `Display` is a single
/// user-facing sentence; the source chain is preserved for `Debug` and for
/// [`Error::AnalysisFailed`].
#[derive(Error, Debug)]
pub enum Error {
    /// A raw reference could not be turned into an absolute http(s) URL.
    ///
    /// Produced by [`resolve`](crate::resolve). The extractor drops these
    /// silently; they are never the result of an analysis.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// The URL supplied by the caller is not a usable page URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// An outbound fetch failed.
    ///
    /// Fatal when it is the page fetch of an analysis or a single-asset
    /// download; never produced for individual bundle assets.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The page responded with something other than HTML.
    #[error("Unsupported content type '{content_type}' for {url} (expected HTML)")]
    UnsupportedContentType {
        /// Page URL.
        url: String,
        /// Content type reported by the server.
        content_type: String,
    },

    /// The analysis a bundle depends on failed; the cause is kept verbatim.
    #[error("Analysis failed: {0}")]
    AnalysisFailed(#[source] Box<Error>),

    /// The outer deadline of an analysis expired.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The HTTP client could not be constructed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The bundle archive could not be written.
    #[error("Archive error: {0}")]
    Archive(String),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("Failed to parse config: {err}"))
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Config(format!("Failed to serialize config: {err}"))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    ///
    /// Only transient fetch failures and deadline expiries qualify. An
    /// [`Error::AnalysisFailed`] inherits the answer of its cause.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Timeout(_) => true,
            Self::AnalysisFailed(cause) => cause.is_recoverable(),
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// Used for structured logging and by the CLI to pick an exit code.
    /// [`Error::AnalysisFailed`] reports the category of its cause so that a
    /// bundle whose page is unreachable is still a `"fetch"` failure.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidReference(_) => "invalid_reference",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Fetch(_) | Self::Network(_) => "fetch",
            Self::UnsupportedContentType { .. } => "content_type",
            Self::AnalysisFailed(cause) => cause.category(),
            Self::Timeout(_) => "timeout",
            Self::Archive(_) => "archive",
            Self::Io(_) => "io",
            Self::Config(_) => "config",
        }
    }

    /// The fetch failure behind this error, looking through [`Error::AnalysisFailed`].
    #[must_use]
    pub fn fetch_kind(&self) -> Option<FetchErrorKind> {
        match self {
            Self::Fetch(e) => Some(e.kind()),
            Self::AnalysisFailed(cause) => cause.fetch_kind(),
            _ => None,
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::error::Error as _;

    fn status(code: u16) -> FetchError {
        FetchError::HttpStatus {
            url: "https://example.com/a.css".to_string(),
            status: code,
        }
    }

    #[test]
    fn test_fetch_error_display_is_distinct_per_kind() {
        let unreachable = FetchError::Unreachable {
            url: "https://down.test/".to_string(),
            reason: "dns error".to_string(),
        };
        let timeout = FetchError::Timeout {
            url: "https://slow.test/".to_string(),
            after: Duration::from_secs(15),
        };
        let too_large = FetchError::TooLarge {
            url: "https://big.test/".to_string(),
            limit: 1024,
        };

        assert_eq!(
            unreachable.to_string(),
            "could not reach 'https://down.test/': dns error"
        );
        assert_eq!(
            timeout.to_string(),
            "request to 'https://slow.test/' timed out after 15s"
        );
        assert_eq!(
            too_large.to_string(),
            "response from 'https://big.test/' exceeds the 1024 byte limit"
        );
        assert_eq!(
            status(404).to_string(),
            "'https://example.com/a.css' returned HTTP 404"
        );
    }

    #[test]
    fn test_fetch_error_recoverability() {
        assert!(status(429).is_recoverable());
        assert!(status(502).is_recoverable());
        assert!(!status(404).is_recoverable());
        assert!(
            !FetchError::TooLarge {
                url: String::new(),
                limit: 1
            }
            .is_recoverable()
        );
    }

    #[test]
    fn test_fetch_error_url_accessor() {
        assert_eq!(status(500).url(), "https://example.com/a.css");
    }

    #[test]
    fn test_error_categories() {
        let cases = vec![
            (Error::InvalidReference("x".into()), "invalid_reference"),
            (Error::InvalidUrl("x".into()), "invalid_url"),
            (Error::from(status(500)), "fetch"),
            (
                Error::UnsupportedContentType {
                    url: "https://example.com/".into(),
                    content_type: "application/pdf".into(),
                },
                "content_type",
            ),
            (Error::Timeout("deadline".into()), "timeout"),
            (Error::Archive("zip".into()), "archive"),
            (Error::Config("bad".into()), "config"),
        ];

        for (error, expected) in cases {
            assert_eq!(error.category(), expected, "wrong category for {error:?}");
        }
    }

    #[test]
    fn test_analysis_failed_keeps_cause() {
        // Given: a page fetch that failed with a status
        let cause = Error::from(status(503));

        // When: it is wrapped as the reason a bundle could not start
        let wrapped = Error::AnalysisFailed(Box::new(cause));

        // Then: category, kind and source all come from the cause
        assert_eq!(wrapped.category(), "fetch");
        assert_eq!(wrapped.fetch_kind(), Some(FetchErrorKind::HttpStatus));
        assert!(wrapped.is_recoverable());
        let source = wrapped.source().unwrap();
        assert_eq!(source.to_string(), "'https://example.com/a.css' returned HTTP 503");
    }

    #[test]
    fn test_fetch_error_is_transparent() {
        let err = Error::from(status(404));
        assert_eq!(err.to_string(), "'https://example.com/a.css' returned HTTP 404");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_config_error_from_toml() {
        let parsed: std::result::Result<toml::Value, _> = toml::from_str("not = [valid");
        let err = Error::from(parsed.unwrap_err());
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().starts_with("Configuration error: Failed to parse config:"));
    }

    proptest! {
        #[test]
        fn test_status_recoverability_matches_class(code in 100u16..600) {
            let expected = code == 429 || code >= 500;
            prop_assert_eq!(status(code).is_recoverable(), expected);
        }
    }
}
