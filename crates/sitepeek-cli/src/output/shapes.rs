//! Serializable command reports for JSON output.
//!
//! The analysis itself serializes straight from
//! [`sitepeek_core::AnalysisResult`]; the shapes here cover the `fetch` and
//! `bundle` commands, whose core results carry raw bytes or error values.

use std::path::Path;

use serde::Serialize;
use sitepeek_core::{BundleReport, DownloadedAsset, SkippedAsset};

/// Result of `sitepeek fetch`.
#[derive(Clone, Debug, Serialize)]
pub struct DownloadOutput {
    /// URL after redirects
    pub url: String,
    /// Reported or guessed content type
    pub content_type: String,
    /// Name suggested by the URL
    pub filename: String,
    /// Size in bytes
    pub bytes: usize,
    /// Where the bytes went; `None` for stdout
    pub saved_to: Option<String>,
}

impl DownloadOutput {
    /// Describe a finished download.
    pub fn new(asset: &DownloadedAsset, saved_to: Option<&Path>) -> Self {
        Self {
            url: asset.url.to_string(),
            content_type: asset.content_type.clone(),
            filename: asset.suggested_filename.clone(),
            bytes: asset.bytes.len(),
            saved_to: saved_to.map(|path| path.display().to_string()),
        }
    }
}

/// One asset left out of a bundle.
#[derive(Clone, Debug, Serialize)]
pub struct SkippedOutput {
    /// Asset URL
    pub url: String,
    /// Category label (`css`, `js`, `images`, `others`)
    pub category: &'static str,
    /// Why the fetch failed
    pub reason: String,
}

impl From<&SkippedAsset> for SkippedOutput {
    fn from(skip: &SkippedAsset) -> Self {
        Self {
            url: skip.reference.url.to_string(),
            category: skip.reference.category.label(),
            reason: skip.error.to_string(),
        }
    }
}

/// Result of `sitepeek bundle`.
#[derive(Clone, Debug, Serialize)]
pub struct BundleOutput {
    /// Archive path
    pub archive: String,
    /// Entry names in write order, `index.html` first
    pub written: Vec<String>,
    /// Assets that could not be fetched
    pub skipped: Vec<SkippedOutput>,
    /// Whether the deadline cut the download short
    pub timed_out: bool,
}

impl BundleOutput {
    /// Describe a finished bundle.
    pub fn new(archive: &Path, report: &BundleReport) -> Self {
        Self {
            archive: archive.display().to_string(),
            written: report.written.clone(),
            skipped: report.skipped.iter().map(SkippedOutput::from).collect(),
            timed_out: report.timed_out,
        }
    }
}
