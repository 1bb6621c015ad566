//! Bounded HTTP retrieval of pages and assets.
//!
//! Every outbound GET goes through a [`PageFetcher`]. Each call carries its
//! own [`FetchLimits`] so the page fetch, stylesheet enrichment and bundle
//! downloads can use different ceilings with a single client. Fetchers never
//! retry; callers decide based on [`FetchError::is_recoverable`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, redirect};
use tracing::debug;
use url::Url;

use crate::config::FetchConfig;
use crate::{Error, FetchError, Result};

/// Time and size ceilings for one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    /// Upper bound on the whole exchange, body included.
    pub timeout: Duration,
    /// Largest body accepted, in bytes.
    pub max_bytes: usize,
}

impl FetchLimits {
    /// Create limits.
    #[must_use]
    pub const fn new(timeout: Duration, max_bytes: usize) -> Self {
        Self { timeout, max_bytes }
    }
}

/// A successful 2xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    /// URL after following redirects.
    pub url: Url,
    /// `Content-Type` header as sent, if any.
    pub content_type: Option<String>,
    /// Full response body.
    pub body: Vec<u8>,
}

impl FetchedResource {
    /// Media type without parameters, lowercased (`text/html; charset=utf-8` -> `text/html`).
    #[must_use]
    pub fn media_type(&self) -> Option<String> {
        self.content_type.as_deref().map(|value| {
            value
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }
}

/// Source of HTTP responses.
///
/// Implemented by [`HttpFetcher`] for real traffic; tests substitute their own.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url`, following redirects, within `limits`.
    ///
    /// # Errors
    ///
    /// A [`FetchError`] for unreachable hosts, expired timeouts, bodies over
    /// the ceiling, and non-2xx statuses.
    async fn fetch(&self, url: &Url, limits: FetchLimits) -> std::result::Result<FetchedResource, FetchError>;
}

/// [`PageFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher from configuration (user agent, redirect limit).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] if the TLS backend cannot be initialized.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(redirect::Policy::limited(config.max_redirects))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_unbounded(
        &self,
        url: &Url,
        limits: FetchLimits,
    ) -> std::result::Result<FetchedResource, FetchError> {
        let max_bytes = limits.max_bytes;
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify(url, limits, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let too_large = || FetchError::TooLarge {
            url: url.to_string(),
            limit: max_bytes,
        };

        if let Some(length) = response.content_length() {
            if usize::try_from(length).map_or(true, |length| length > max_bytes) {
                return Err(too_large());
            }
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| classify(url, limits, &e))? {
            if body.len() + chunk.len() > max_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        debug!("Fetched {} bytes from {}", body.len(), final_url);

        Ok(FetchedResource {
            url: final_url,
            content_type,
            body,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &Url,
        limits: FetchLimits,
    ) -> std::result::Result<FetchedResource, FetchError> {
        match tokio::time::timeout(limits.timeout, self.fetch_unbounded(url, limits)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                after: limits.timeout,
            }),
        }
    }
}

fn classify(url: &Url, limits: FetchLimits, err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::Timeout {
            url: url.to_string(),
            after: limits.timeout,
        };
    }

    let reason = if err.is_redirect() {
        "too many redirects".to_string()
    } else {
        describe_chain(err)
    };
    FetchError::Unreachable {
        url: url.to_string(),
        reason,
    }
}

fn describe_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// A single downloaded asset, ready to hand to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedAsset {
    /// URL after redirects.
    pub url: Url,
    /// Server-reported content type, or a guess from the extension.
    pub content_type: String,
    /// Last path segment without query, or `file`.
    pub suggested_filename: String,
    /// Raw bytes.
    pub bytes: Vec<u8>,
}

impl From<FetchedResource> for DownloadedAsset {
    fn from(resource: FetchedResource) -> Self {
        let content_type = resource
            .content_type
            .unwrap_or_else(|| guess_content_type(&resource.url).to_string());
        let suggested_filename =
            suggested_filename(&resource.url).unwrap_or_else(|| "file".to_string());
        Self {
            url: resource.url,
            content_type,
            suggested_filename,
            bytes: resource.body,
        }
    }
}

const EXTENSION_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("mjs", "application/javascript"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    ("avif", "image/avif"),
    ("ico", "image/x-icon"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("eot", "application/vnd.ms-fontobject"),
    ("otf", "font/otf"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
];

/// Guess a content type from the URL path extension.
///
/// Falls back to `application/octet-stream`.
#[must_use]
pub fn guess_content_type(url: &Url) -> &'static str {
    let Some(name) = url.path_segments().and_then(|mut s| s.next_back()) else {
        return "application/octet-stream";
    };
    let Some((_, extension)) = name.rsplit_once('.') else {
        return "application/octet-stream";
    };
    let extension = extension.to_ascii_lowercase();
    EXTENSION_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map_or("application/octet-stream", |(_, content_type)| content_type)
}

/// Last non-empty path segment, percent-decoded. `None` for directory URLs.
#[must_use]
pub fn suggested_filename(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    if segment.is_empty() {
        return None;
    }
    let raw = urlencoding::decode_binary(segment.as_bytes());
    let decoded = String::from_utf8_lossy(&raw).into_owned();
    if decoded.trim().is_empty() {
        None
    } else {
        Some(decoded)
    }
}
