//! The three inbound operations behind one handle.

use std::io::{Seek, Write};
use std::sync::Arc;

use crate::analyzer::Analyzer;
use crate::bundle::{BundleBuilder, BundleReport, BundleRequest, BundleStream, write_bundle};
use crate::config::{BundleCaps, Config};
use crate::fetcher::{DownloadedAsset, FetchLimits, HttpFetcher, PageFetcher};
use crate::resolver::parse_page_url;
use crate::types::AnalysisResult;
use crate::Result;

/// Entry point for analysis, single-asset download and bundling.
///
/// Holds no per-request state; one instance can serve concurrent calls.
///
/// ```rust,no_run
/// use sitepeek_core::{Config, SitePeek};
///
/// # async fn example() -> sitepeek_core::Result<()> {
/// let peek = SitePeek::new(Config::default())?;
/// let result = peek.analyze("https://example.com").await?;
/// println!("{} stylesheets", result.summary.total_css);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SitePeek<F = HttpFetcher> {
    config: Config,
    fetcher: Arc<F>,
}

impl SitePeek<HttpFetcher> {
    /// Create an instance backed by a real HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Network`] if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        Ok(Self::with_fetcher(config, fetcher))
    }
}

impl<F: PageFetcher + 'static> SitePeek<F> {
    /// Create an instance over any fetcher.
    #[must_use]
    pub fn with_fetcher(config: Config, fetcher: F) -> Self {
        Self {
            config,
            fetcher: Arc::new(fetcher),
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Analyze the page at `url`.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidUrl`] for unusable input, otherwise the errors of
    /// [`Analyzer::analyze`].
    pub async fn analyze(&self, url: &str) -> Result<AnalysisResult> {
        let page_url = parse_page_url(url)?;
        self.analyzer().analyze(&page_url).await
    }

    /// An analyzer sharing this instance's fetcher and configuration.
    #[must_use]
    pub fn analyzer(&self) -> Analyzer<F> {
        Analyzer::new(Arc::clone(&self.fetcher), &self.config)
    }

    /// Download one asset.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidUrl`] or [`crate::Error::Fetch`].
    pub async fn fetch_asset(&self, url: &str) -> Result<DownloadedAsset> {
        self.fetch_asset_with(url, self.config.fetch.asset_limits()).await
    }

    /// Download one asset with explicit limits.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidUrl`] or [`crate::Error::Fetch`].
    pub async fn fetch_asset_with(&self, url: &str, limits: FetchLimits) -> Result<DownloadedAsset> {
        let asset_url = parse_page_url(url)?;
        let resource = self.fetcher.fetch(&asset_url, limits).await?;
        Ok(DownloadedAsset::from(resource))
    }

    /// A bundle builder sharing this instance's fetcher and configuration.
    #[must_use]
    pub fn bundle_builder(&self) -> BundleBuilder<F> {
        BundleBuilder::new(Arc::clone(&self.fetcher), &self.config)
    }

    /// Start a bundle and return its entry stream.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidUrl`] or [`crate::Error::AnalysisFailed`].
    pub async fn bundle_stream(&self, url: &str, caps: BundleCaps) -> Result<BundleStream> {
        let page_url = parse_page_url(url)?;
        self.bundle_builder()
            .stream(BundleRequest::new(page_url, caps))
            .await
    }

    /// Build a complete zip bundle on `writer`.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidUrl`], [`crate::Error::AnalysisFailed`], or
    /// [`crate::Error::Archive`]. Individual asset failures only show up in
    /// the report.
    pub async fn build_bundle<W: Write + Seek>(
        &self,
        url: &str,
        caps: BundleCaps,
        writer: W,
    ) -> Result<(W, BundleReport)> {
        let stream = self.bundle_stream(url, caps).await?;
        write_bundle(stream, writer).await
    }
}
