//! Capped, failure-tolerant bundling of a page and its assets.
//!
//! A bundle starts with an analysis of the page. The first N references of
//! each category (see [`BundleCaps`]) are then fetched through a bounded
//! worker pool and streamed out as [`BundleEvent`]s, the page HTML first.
//! Assets that fail to download are reported and skipped; they never fail
//! the bundle.
//!
//! ## Layout
//!
//! ```text
//! index.html
//! css/<name>
//! js/<name>
//! images/<name>
//! others/<name>
//! ```
//!
//! Entry names are the sanitized last URL segment. Names never contain a
//! path separator and are never `.` or `..`, so no entry can escape the
//! archive root.

mod archive;
mod builder;

pub use archive::{ArchiveWriter, write_bundle, write_bundle_with};
pub use builder::{BundleBuilder, BundleStream};

use std::collections::HashSet;

use url::Url;

use crate::FetchError;
use crate::config::BundleCaps;
use crate::fetcher::suggested_filename;
use crate::types::{AnalysisResult, AssetCategory, AssetReference};

/// Name of the page source entry.
pub const INDEX_ENTRY: &str = "index.html";

/// What to bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    /// Page whose assets are bundled.
    pub page_url: Url,
    /// Per-category limits.
    pub caps: BundleCaps,
}

impl BundleRequest {
    /// Create a request.
    #[must_use]
    pub const fn new(page_url: Url, caps: BundleCaps) -> Self {
        Self { page_url, caps }
    }
}

/// One file of the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    /// Path inside the archive, e.g. `css/main.css`.
    pub name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// An asset that was selected but could not be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAsset {
    /// The selected reference.
    pub reference: AssetReference,
    /// Why the download failed.
    pub error: FetchError,
}

/// Items produced by a [`BundleStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleEvent {
    /// A file ready to be written.
    Entry(BundleEntry),
    /// A selected asset that was skipped.
    Skipped(SkippedAsset),
}

/// Outcome of writing a bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleReport {
    /// Entry names in the order they were written; `index.html` is first.
    pub written: Vec<String>,
    /// Assets that failed to download.
    pub skipped: Vec<SkippedAsset>,
    /// Whether the outer deadline stopped the run before every asset finished.
    pub timed_out: bool,
}

impl BundleReport {
    /// Number of asset entries written, excluding `index.html`.
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.written.iter().filter(|name| *name != INDEX_ENTRY).count()
    }
}

/// An asset selected for download with its entry name already assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlannedAsset {
    pub reference: AssetReference,
    pub entry_name: String,
}

/// Select the first `cap` references of each category, in extraction order,
/// and give each a unique entry name.
pub(crate) fn plan(result: &AnalysisResult, caps: BundleCaps) -> Vec<PlannedAsset> {
    let mut planned = Vec::new();
    for category in AssetCategory::ALL {
        let mut taken = HashSet::new();
        for reference in result.assets(category).iter().take(caps.get(category)) {
            let base = entry_filename(&reference.url, category);
            let name = unique_name(&base, &mut taken);
            planned.push(PlannedAsset {
                reference: reference.clone(),
                entry_name: format!("{}/{name}", category.label()),
            });
        }
    }
    planned
}

/// A safe filename for `url` within `category`'s directory.
#[must_use]
pub fn entry_filename(url: &Url, category: AssetCategory) -> String {
    suggested_filename(url)
        .map(|name| sanitize_filename(&name))
        .filter(|name| !name.is_empty() && name != "." && name != "..")
        .unwrap_or_else(|| category.fallback_filename().to_string())
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `logo.png`, then `logo-1.png`, `logo-2.png`, ... Comparison ignores case.
fn unique_name(base: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(base.to_ascii_lowercase()) {
        return base.to_string();
    }
    let (stem, extension) = match base.rfind('.') {
        Some(index) if index > 0 => base.split_at(index),
        _ => (base, ""),
    };
    let mut counter = 1;
    loop {
        let candidate = format!("{stem}-{counter}{extension}");
        if taken.insert(candidate.to_ascii_lowercase()) {
            return candidate;
        }
        counter += 1;
    }
}
