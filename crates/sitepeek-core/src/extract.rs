//! Asset reference extraction from HTML.
//!
//! The document is walked once in document order. Each element is
//! categorized by what kind of reference it makes (tag, attribute, `rel`
//! tokens), never by the URL suffix: a `<script src="/app">` is a script even
//! without a `.js` extension.
//!
//! ## Coverage
//!
//! | Source | Category |
//! |---|---|
//! | `link[rel=stylesheet]`, `@import` in `<style>` | css |
//! | `script[src]`, `link[rel=modulepreload]` | js |
//! | `img[src]`, first `srcset` candidate, `picture > source[srcset]`, icons, `video[poster]`, `input[type=image]` | images |
//! | media `src`, `embed`, `object[data]`, `track`, manifests, font links, downloadable `a[href]` | others |
//! | `url(...)` in inline styles and `<style>` blocks | by property |
//!
//! ```rust
//! use sitepeek_core::{extract, SourceDocument};
//! use url::Url;
//!
//! let html = r#"<link rel="stylesheet" href="/app.css"><script src="app.js"></script>"#;
//! let doc = SourceDocument::new(Url::parse("https://a.com/docs/")?, html.to_string());
//! let assets = extract(&doc);
//! assert_eq!(assets.css[0].url.as_str(), "https://a.com/app.css");
//! assert_eq!(assets.js[0].url.as_str(), "https://a.com/docs/app.js");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use crate::resolver::resolve;
use crate::styles::{declarations, import_targets, strip_comments, url_targets};
use crate::types::{AssetCategory, AssetReference, ExtractedAssets, SourceDocument};

/// Selector matching every element, yielded in document order
///
/// SAFETY: Selector is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static ALL_ELEMENTS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("*").unwrap());

/// Selector for the document base
///
/// SAFETY: Selector is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static BASE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("base[href]").unwrap());

/// Link targets that are downloadable files rather than pages.
const DOWNLOAD_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "zip", "woff", "woff2", "ttf", "eot", "otf", "mp4", "webm",
    "mp3", "wav", "ogg",
];

const FONT_EXTENSIONS: &[&str] = &["woff", "woff2", "ttf", "eot", "otf"];

/// Collects references for one document, deduplicating per category.
struct Collector {
    base: Url,
    assets: ExtractedAssets,
    seen: HashSet<(AssetCategory, Url)>,
}

impl Collector {
    fn new(base: Url) -> Self {
        Self {
            base,
            assets: ExtractedAssets::default(),
            seen: HashSet::new(),
        }
    }

    fn push(&mut self, category: AssetCategory, raw: &str) {
        match resolve(&self.base, raw) {
            Ok(url) => {
                if self.seen.insert((category, url.clone())) {
                    self.assets
                        .get_mut(category)
                        .push(AssetReference::new(url, category));
                }
            },
            Err(e) => debug!("Dropping {category} reference: {e}"),
        }
    }

    fn push_attr(&mut self, category: AssetCategory, element: &ElementRef<'_>, attr: &str) {
        if let Some(value) = element.value().attr(attr) {
            self.push(category, value);
        }
    }

    fn push_first_srcset(&mut self, category: AssetCategory, element: &ElementRef<'_>) {
        if let Some(candidate) = element.value().attr("srcset").and_then(first_srcset_candidate) {
            self.push(category, candidate);
        }
    }

    /// `url(...)` targets in CSS declarations, categorized by property.
    fn push_css_urls(&mut self, css: &str) {
        let css = strip_comments(css);
        for declaration in declarations(&css) {
            let Some(category) = url_category(&declaration.property) else {
                continue;
            };
            for target in url_targets(declaration.value) {
                self.push(category, target);
            }
        }
    }

    fn visit(&mut self, element: &ElementRef<'_>) {
        let name = element.value().name();
        match name {
            "link" => self.visit_link(element),
            "script" => self.push_attr(AssetCategory::Js, element, "src"),
            "img" => {
                self.push_attr(AssetCategory::Image, element, "src");
                self.push_first_srcset(AssetCategory::Image, element);
            },
            "source" => {
                self.push_first_srcset(AssetCategory::Image, element);
                self.push_attr(AssetCategory::Other, element, "src");
            },
            "video" => {
                self.push_attr(AssetCategory::Other, element, "src");
                self.push_attr(AssetCategory::Image, element, "poster");
            },
            "audio" | "track" | "embed" => self.push_attr(AssetCategory::Other, element, "src"),
            "object" => self.push_attr(AssetCategory::Other, element, "data"),
            "input" => {
                let is_image = element
                    .value()
                    .attr("type")
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case("image"));
                if is_image {
                    self.push_attr(AssetCategory::Image, element, "src");
                }
            },
            "a" => {
                if let Some(href) = element.value().attr("href") {
                    if has_extension(href, DOWNLOAD_EXTENSIONS) {
                        self.push(AssetCategory::Other, href);
                    }
                }
            },
            "style" => {
                let css: String = element.text().collect();
                for target in import_targets(&strip_comments(&css)) {
                    self.push(AssetCategory::Css, target);
                }
                self.push_css_urls(&css);
            },
            _ => {},
        }

        if let Some(style) = element.value().attr("style") {
            self.push_css_urls(style);
        }
    }

    fn visit_link(&mut self, element: &ElementRef<'_>) {
        let Some(href) = element.value().attr("href") else {
            return;
        };
        let rel = element.value().attr("rel").unwrap_or_default().to_ascii_lowercase();
        let tokens: Vec<&str> = rel.split_ascii_whitespace().collect();
        let has = |token: &str| tokens.contains(&token);

        let category = if has("stylesheet") {
            Some(AssetCategory::Css)
        } else if has("modulepreload") {
            Some(AssetCategory::Js)
        } else if has("preload") || has("prefetch") {
            let destination = element.value().attr("as").unwrap_or_default();
            Some(match destination.trim().to_ascii_lowercase().as_str() {
                "style" => AssetCategory::Css,
                "script" => AssetCategory::Js,
                "image" => AssetCategory::Image,
                _ => AssetCategory::Other,
            })
        } else if tokens.iter().any(|t| t.contains("icon")) {
            Some(AssetCategory::Image)
        } else if has("manifest") || has_extension(href, FONT_EXTENSIONS) {
            Some(AssetCategory::Other)
        } else {
            None
        };

        if let Some(category) = category {
            self.push(category, href);
        }
    }
}

/// Extract the categorized asset references of a document.
///
/// References are resolved against the document's base URL, or against its
/// `<base href>` when present. Unresolvable references are dropped. Each
/// category list is in document order with no duplicate URLs; the same URL
/// may still appear in two categories.
#[must_use]
pub fn extract(document: &SourceDocument) -> ExtractedAssets {
    let html = Html::parse_document(document.raw_html());
    let base = effective_base(&html, document.base_url());

    let mut collector = Collector::new(base);
    for element in html.select(&ALL_ELEMENTS) {
        collector.visit(&element);
    }

    debug!(
        "Extracted {} references from {}",
        collector.assets.len(),
        document.base_url()
    );
    collector.assets
}

fn effective_base(html: &Html, document_base: &Url) -> Url {
    html.select(&BASE_SELECTOR)
        .next()
        .and_then(|base| base.value().attr("href"))
        .and_then(|href| resolve(document_base, href).ok())
        .unwrap_or_else(|| document_base.clone())
}

/// First URL of a `srcset` list (`a.png 1x, b.png 2x` -> `a.png`).
fn first_srcset_candidate(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .and_then(|candidate| candidate.split_ascii_whitespace().next())
}

/// Category for `url(...)` values of a CSS property, if the property loads assets.
fn url_category(property: &str) -> Option<AssetCategory> {
    const IMAGE_PREFIXES: &[&str] = &["background", "mask", "list-style", "border-image", "--"];
    if property == "src" {
        Some(AssetCategory::Other)
    } else if property == "content"
        || property == "cursor"
        || IMAGE_PREFIXES.iter().any(|p| property.starts_with(p))
    {
        Some(AssetCategory::Image)
    } else {
        None
    }
}

fn has_extension(reference: &str, extensions: &[&str]) -> bool {
    let path = reference
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    path.rsplit_once('.')
        .filter(|(_, ext)| !ext.contains('/'))
        .is_some_and(|(_, ext)| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}
