//! Page analysis: fetch, extract, scan styles, build the path tree.
//!
//! An analysis moves through [`AnalysisStage`]s strictly in order. The first
//! failing stage ends the run with its error; nothing is retried here. The
//! whole run is bounded by one outer deadline.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::extract::extract;
use crate::fetcher::{FetchLimits, PageFetcher};
use crate::styles::analyze_styles;
use crate::tree::PathTree;
use crate::types::{AnalysisResult, AssetReference, SourceDocument};
use crate::{Error, Result};

/// Media types accepted as HTML pages.
const HTML_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Where an analysis currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    /// Retrieving the page
    Fetching,
    /// Collecting asset references
    Extracting,
    /// Collecting colors and fonts
    StyleScanning,
    /// Building the path tree
    StructureBuilding,
    /// Finished successfully
    Done,
    /// Ended by an error
    Failed,
}

/// Whether external stylesheets are fetched to enrich colors and fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleEnrichment {
    /// Only inline styles and `<style>` blocks are scanned.
    Disabled,
    /// The first `max_sheets` stylesheet references are fetched; failures are ignored.
    Stylesheets {
        /// How many stylesheets to fetch at most
        max_sheets: usize,
        /// Limits for each stylesheet fetch
        limits: FetchLimits,
    },
}

impl StyleEnrichment {
    /// Enrichment policy from configuration.
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        if config.analysis.enrich_stylesheets && config.analysis.max_enrichment_stylesheets > 0 {
            Self::Stylesheets {
                max_sheets: config.analysis.max_enrichment_stylesheets,
                limits: config.fetch.asset_limits(),
            }
        } else {
            Self::Disabled
        }
    }
}

/// Runs analyses with a shared fetcher.
#[derive(Debug)]
pub struct Analyzer<F> {
    fetcher: Arc<F>,
    page_limits: FetchLimits,
    enrichment: StyleEnrichment,
    deadline: Duration,
}

impl<F> Clone for Analyzer<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            page_limits: self.page_limits,
            enrichment: self.enrichment,
            deadline: self.deadline,
        }
    }
}

impl<F: PageFetcher> Analyzer<F> {
    /// Create an analyzer using the limits and policies in `config`.
    #[must_use]
    pub fn new(fetcher: Arc<F>, config: &Config) -> Self {
        Self {
            fetcher,
            page_limits: config.fetch.page_limits(),
            enrichment: StyleEnrichment::from_config(config),
            deadline: config.analysis.deadline(),
        }
    }

    /// Replace the stylesheet enrichment policy.
    #[must_use]
    pub const fn with_enrichment(mut self, enrichment: StyleEnrichment) -> Self {
        self.enrichment = enrichment;
        self
    }

    /// Replace the outer deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Analyze the page at `page_url`.
    ///
    /// # Errors
    ///
    /// - [`Error::Fetch`] when the page cannot be retrieved
    /// - [`Error::UnsupportedContentType`] when the response is not HTML
    /// - [`Error::Timeout`] when the outer deadline expires
    pub async fn analyze(&self, page_url: &Url) -> Result<AnalysisResult> {
        let outcome = match tokio::time::timeout(self.deadline, self.run(page_url)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::Timeout(format!(
                "analysis of {page_url} did not finish within {}s",
                self.deadline.as_secs()
            ))),
        };

        match &outcome {
            Ok(result) => info!(
                "Analyzed {}: {} css, {} js, {} images, {} others, {} colors, {} fonts",
                page_url,
                result.summary.total_css,
                result.summary.total_js,
                result.summary.total_images,
                result.summary.total_others,
                result.colors.len(),
                result.fonts.len()
            ),
            Err(e) => debug!(stage = ?AnalysisStage::Failed, "Analysis of {} failed: {}", page_url, e),
        }
        outcome
    }

    async fn run(&self, page_url: &Url) -> Result<AnalysisResult> {
        enter(AnalysisStage::Fetching, page_url);
        let document = self.fetch_document(page_url).await?;

        enter(AnalysisStage::Extracting, page_url);
        let assets = extract(&document);

        enter(AnalysisStage::StyleScanning, page_url);
        let external_css = self.fetch_stylesheets(&assets.css).await;
        let styles = analyze_styles(&document, &external_css);

        enter(AnalysisStage::StructureBuilding, page_url);
        let structure = PathTree::from_references(assets.iter());

        enter(AnalysisStage::Done, page_url);
        Ok(AnalysisResult::new(document, assets, styles, structure))
    }

    /// Fetch a page and check that it is HTML.
    ///
    /// The returned document's base URL is the final URL after redirects.
    pub async fn fetch_document(&self, page_url: &Url) -> Result<SourceDocument> {
        let resource = self.fetcher.fetch(page_url, self.page_limits).await?;

        match resource.media_type() {
            Some(media_type) if HTML_TYPES.contains(&media_type.as_str()) => {},
            Some(media_type) => {
                return Err(Error::UnsupportedContentType {
                    url: resource.url.to_string(),
                    content_type: media_type,
                });
            },
            None if looks_like_html(&resource.body) => {
                debug!("{} sent no Content-Type; body looks like HTML", resource.url);
            },
            None => {
                return Err(Error::UnsupportedContentType {
                    url: resource.url.to_string(),
                    content_type: "unknown".to_string(),
                });
            },
        }

        let html = String::from_utf8_lossy(&resource.body).into_owned();
        Ok(SourceDocument::new(resource.url, html))
    }

    async fn fetch_stylesheets(&self, css: &[AssetReference]) -> Vec<String> {
        let StyleEnrichment::Stylesheets { max_sheets, limits } = self.enrichment else {
            return Vec::new();
        };

        let fetches = css.iter().take(max_sheets).map(|reference| async move {
            match self.fetcher.fetch(&reference.url, limits).await {
                Ok(resource) => Some(String::from_utf8_lossy(&resource.body).into_owned()),
                Err(e) => {
                    warn!("Skipping stylesheet for style scan: {}", e);
                    None
                },
            }
        });

        join_all(fetches).await.into_iter().flatten().collect()
    }
}

fn enter(stage: AnalysisStage, page_url: &Url) {
    debug!(stage = ?stage, "Analysis of {}", page_url);
}

fn looks_like_html(body: &[u8]) -> bool {
    let text = String::from_utf8_lossy(&body[..body.len().min(512)]);
    text.trim_start_matches('\u{feff}').trim_start().starts_with('<')
}
