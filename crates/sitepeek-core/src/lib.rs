//! # sitepeek-core
//!
//! Core pipeline for sitepeek: fetch a web page, inventory the assets it
//! references, and bundle a capped subset of them into a zip archive.
//!
//! ## Architecture
//!
//! - **Resolver**: turns raw attribute values into absolute http(s) URLs
//! - **Fetcher**: one bounded GET per call, behind the [`PageFetcher`] trait
//! - **Extractor**: categorizes references by tag and attribute
//! - **Styles**: scans CSS text for color literals and font families
//! - **Tree**: builds the display tree over asset paths
//! - **Analyzer**: runs the above as one all-or-nothing analysis
//! - **Bundle**: downloads selected assets with bounded concurrency and
//!   writes them, with the page source, into an archive
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sitepeek_core::{Config, SitePeek};
//!
//! # async fn example() -> sitepeek_core::Result<()> {
//! let peek = SitePeek::new(Config::load()?)?;
//!
//! let result = peek.analyze("https://example.com").await?;
//! for css in &result.css_files {
//!     println!("{}", css.url);
//! }
//!
//! let file = std::fs::File::create("website_assets.zip")?;
//! let (_, report) = peek
//!     .build_bundle("https://example.com", peek.config().bundle.caps, file)
//!     .await?;
//! println!("{} files, {} skipped", report.written.len(), report.skipped.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Page-level failures end an operation with a single [`Error`]; asset-level
//! failures during a bundle are skipped and reported:
//!
//! ```rust,no_run
//! use sitepeek_core::{Config, Error, FetchErrorKind, SitePeek};
//!
//! # async fn example() -> sitepeek_core::Result<()> {
//! let peek = SitePeek::new(Config::default())?;
//! match peek.analyze("https://unreachable.invalid").await {
//!     Ok(result) => println!("{} images", result.summary.total_images),
//!     Err(e) if e.fetch_kind() == Some(FetchErrorKind::Unreachable) => eprintln!("Site is down: {e}"),
//!     Err(Error::UnsupportedContentType { content_type, .. }) => eprintln!("Not HTML: {content_type}"),
//!     Err(e) => eprintln!("Analysis failed: {e}"),
//! }
//! # Ok(())
//! # }
//! ```

/// Page analysis state machine
pub mod analyzer;
/// Bundle planning, concurrent download and archive writing
pub mod bundle;
/// Configuration loading and defaults
pub mod config;
/// Error types and result aliases
pub mod error;
/// Asset reference extraction from HTML
pub mod extract;
/// HTTP fetching with time and size ceilings
pub mod fetcher;
/// URL resolution
pub mod resolver;
/// High-level facade over the pipeline
pub mod service;
/// Color and font scanning
pub mod styles;
/// Path tree over asset URLs
pub mod tree;
/// Core data types and structures
pub mod types;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use analyzer::{AnalysisStage, Analyzer, StyleEnrichment};
pub use bundle::{
    ArchiveWriter, BundleBuilder, BundleEntry, BundleEvent, BundleReport, BundleRequest,
    BundleStream, INDEX_ENTRY, SkippedAsset, write_bundle, write_bundle_with,
};
pub use config::{AnalysisConfig, BundleCaps, BundleConfig, Config, FetchConfig};
pub use error::{Error, FetchError, FetchErrorKind, Result};
pub use extract::extract;
pub use fetcher::{DownloadedAsset, FetchLimits, FetchedResource, HttpFetcher, PageFetcher};
pub use resolver::{parse_page_url, resolve};
pub use service::SitePeek;
pub use styles::analyze_styles;
pub use tree::{PathNode, PathTree};
pub use types::*;
