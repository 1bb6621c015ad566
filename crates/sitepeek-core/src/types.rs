//! Core data types shared across the pipeline.

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use url::Url;

use crate::tree::PathTree;

/// Category of a discovered asset, assigned by the kind of reference
/// (tag and attribute) rather than by URL suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    /// Stylesheets
    Css,
    /// Scripts
    Js,
    /// Images and icons
    Image,
    /// Fonts, media, embedded objects and downloadable documents
    Other,
}

impl AssetCategory {
    /// All categories in presentation order.
    pub const ALL: [Self; 4] = [Self::Css, Self::Js, Self::Image, Self::Other];

    /// Plural label, also used as the bundle directory name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Js => "js",
            Self::Image => "images",
            Self::Other => "others",
        }
    }

    /// Filename used in a bundle when the URL has no usable last segment.
    #[must_use]
    pub const fn fallback_filename(self) -> &'static str {
        match self {
            Self::Css => "style.css",
            Self::Js => "script.js",
            Self::Image => "image.jpg",
            Self::Other => "file",
        }
    }
}

impl std::fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// An absolute asset URL tagged with its category.
///
/// Serializes as the bare URL string, which is what the wire format lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetReference {
    /// Resolved absolute URL.
    pub url: Url,
    /// How the page referenced it.
    pub category: AssetCategory,
}

impl AssetReference {
    /// Create a reference.
    #[must_use]
    pub const fn new(url: Url, category: AssetCategory) -> Self {
        Self { url, category }
    }
}

impl Serialize for AssetReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.url.as_str())
    }
}

/// A fetched page: its base URL and raw HTML. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    base_url: Url,
    raw_html: String,
}

impl SourceDocument {
    /// Wrap fetched HTML together with the URL it was served from.
    #[must_use]
    pub const fn new(base_url: Url, raw_html: String) -> Self {
        Self { base_url, raw_html }
    }

    /// URL that relative references resolve against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The page source as received.
    #[must_use]
    pub fn raw_html(&self) -> &str {
        &self.raw_html
    }

    /// Take the HTML back out.
    #[must_use]
    pub fn into_html(self) -> String {
        self.raw_html
    }
}

/// Per-category asset lists produced by the extractor.
///
/// Each list is in document order and holds no duplicate URLs. The same URL
/// may appear in two different lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedAssets {
    /// Stylesheets
    pub css: Vec<AssetReference>,
    /// Scripts
    pub js: Vec<AssetReference>,
    /// Images
    pub images: Vec<AssetReference>,
    /// Everything else
    pub others: Vec<AssetReference>,
}

impl ExtractedAssets {
    /// The list for one category.
    #[must_use]
    pub fn get(&self, category: AssetCategory) -> &[AssetReference] {
        match category {
            AssetCategory::Css => &self.css,
            AssetCategory::Js => &self.js,
            AssetCategory::Image => &self.images,
            AssetCategory::Other => &self.others,
        }
    }

    pub(crate) fn get_mut(&mut self, category: AssetCategory) -> &mut Vec<AssetReference> {
        match category {
            AssetCategory::Css => &mut self.css,
            AssetCategory::Js => &mut self.js,
            AssetCategory::Image => &mut self.images,
            AssetCategory::Other => &mut self.others,
        }
    }

    /// All references, category by category.
    pub fn iter(&self) -> impl Iterator<Item = &AssetReference> {
        AssetCategory::ALL
            .into_iter()
            .flat_map(move |category| self.get(category).iter())
    }

    /// Total number of references across categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.css.len() + self.js.len() + self.images.len() + self.others.len()
    }

    /// Whether nothing was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counts per category.
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary {
            total_css: self.css.len(),
            total_js: self.js.len(),
            total_images: self.images.len(),
            total_others: self.others.len(),
        }
    }
}

/// Color literals and font families found in a page and its stylesheets.
///
/// Both sets are deduplicated by exact text and iterate in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleInventory {
    /// Hex, `rgb()`/`rgba()` and `hsl()`/`hsla()` literals as written.
    pub colors: BTreeSet<String>,
    /// Font family names with quotes removed.
    pub fonts: BTreeSet<String>,
}

impl StyleInventory {
    /// Fold another inventory into this one.
    pub fn merge(&mut self, other: Self) {
        self.colors.extend(other.colors);
        self.fonts.extend(other.fonts);
    }
}

/// Per-category counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of stylesheets
    pub total_css: usize,
    /// Number of scripts
    pub total_js: usize,
    /// Number of images
    pub total_images: usize,
    /// Number of other files
    pub total_others: usize,
}

/// Everything one analysis produced.
///
/// Serializes to the wire record consumed by UIs: `html_source`, the four URL
/// lists, `colors`, `fonts`, `structure` and `summary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    /// URL the page was served from.
    #[serde(skip)]
    pub page_url: Url,
    /// Raw page HTML.
    pub html_source: String,
    /// Stylesheet references
    pub css_files: Vec<AssetReference>,
    /// Script references
    pub js_files: Vec<AssetReference>,
    /// Image references
    pub images: Vec<AssetReference>,
    /// Other references
    pub others: Vec<AssetReference>,
    /// Every color literal found (no cap; see [`AnalysisResult::palette`]).
    pub colors: Vec<String>,
    /// Every font family found.
    pub fonts: Vec<String>,
    /// Path tree over all asset URLs.
    pub structure: PathTree,
    /// Counts per category.
    pub summary: Summary,
}

impl AnalysisResult {
    /// Assemble a result from the outputs of each stage.
    #[must_use]
    pub fn new(
        document: SourceDocument,
        assets: ExtractedAssets,
        styles: StyleInventory,
        structure: PathTree,
    ) -> Self {
        let summary = assets.summary();
        let ExtractedAssets {
            css,
            js,
            images,
            others,
        } = assets;
        let page_url = document.base_url().clone();
        Self {
            page_url,
            html_source: document.into_html(),
            css_files: css,
            js_files: js,
            images,
            others,
            colors: styles.colors.into_iter().collect(),
            fonts: styles.fonts.into_iter().collect(),
            structure,
            summary,
        }
    }

    /// The references of one category, in extraction order.
    #[must_use]
    pub fn assets(&self, category: AssetCategory) -> &[AssetReference] {
        match category {
            AssetCategory::Css => &self.css_files,
            AssetCategory::Js => &self.js_files,
            AssetCategory::Image => &self.images,
            AssetCategory::Other => &self.others,
        }
    }

    /// The first `limit` colors, for swatch displays.
    #[must_use]
    pub fn palette(&self, limit: usize) -> &[String] {
        &self.colors[..self.colors.len().min(limit)]
    }
}
