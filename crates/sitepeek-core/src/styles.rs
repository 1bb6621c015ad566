//! Color and font scanning over inline styles, `<style>` blocks and
//! fetched stylesheets.
//!
//! This is textual pattern scanning, not CSS parsing. Only declaration
//! values are inspected, so selectors like `#nav` are never mistaken for
//! colors.
//!
//! ```rust
//! use sitepeek_core::styles::scan_css;
//! use sitepeek_core::StyleInventory;
//!
//! let mut inventory = StyleInventory::default();
//! scan_css("p { color: #FF0000; font-family: 'Inter', Arial, sans-serif; }", &mut inventory);
//! assert!(inventory.colors.contains("#FF0000"));
//! assert!(inventory.fonts.contains("Inter"));
//! ```

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

use crate::types::{SourceDocument, StyleInventory};

/// Regex for CSS comments
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

/// Regex for `property: value` declarations, inside or outside a block
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static DECLARATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([-\w]+)\s*:\s*([^;{}]+)").unwrap());

/// Regex for hex, rgb(a) and hsl(a) color literals
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    let number = r"(?:\d*\.)?\d+";
    let sep = r"\s*(?:,\s*|\s+)";
    let alpha = format!(r"(?:\s*(?:,|/)\s*{number}%?)?");
    let hex = r"#(?:[0-9a-fA-F]{8}|[0-9a-fA-F]{6}|[0-9a-fA-F]{3})\b";
    let rgb = format!(r"\b[rR][gG][bB][aA]?\(\s*{number}%?{sep}{number}%?{sep}{number}%?{alpha}\s*\)");
    let hsl = format!(
        r"\b[hH][sS][lL][aA]?\(\s*{number}(?:deg)?{sep}{number}%{sep}{number}%{alpha}\s*\)"
    );
    Regex::new(&format!("{hex}|{rgb}|{hsl}")).unwrap()
});

/// Regex for `url(...)` with optional quoting
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static URL_FN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^)'"\s]*))\s*\)"#).unwrap()
});

/// Regex for `@import "x.css"` and `@import url(x.css)`
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)@import\s+(?:url\(\s*)?["']?([^"')\s;]+)["']?"#).unwrap()
});

/// Selector for elements carrying an inline style
///
/// SAFETY: Selector is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static STYLED_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("[style]").unwrap());

/// Selector for `<style>` blocks
///
/// SAFETY: Selector is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static STYLE_BLOCK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("style").unwrap());

/// A single `property: value` pair with the property lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declaration<'a> {
    pub property: String,
    pub value: &'a str,
}

/// Remove `/* ... */` comments.
pub(crate) fn strip_comments(css: &str) -> std::borrow::Cow<'_, str> {
    COMMENT_RE.replace_all(css, " ")
}

/// Declarations in comment-free CSS text, in source order.
pub(crate) fn declarations(css: &str) -> impl Iterator<Item = Declaration<'_>> {
    DECLARATION_RE.captures_iter(css).filter_map(|cap| {
        let property = cap.get(1)?.as_str().to_ascii_lowercase();
        let value = cap.get(2)?.as_str().trim();
        Some(Declaration { property, value })
    })
}

/// Targets of every `url(...)` in a declaration value. Empty targets are skipped.
pub(crate) fn url_targets(value: &str) -> Vec<&str> {
    URL_FN_RE
        .captures_iter(value)
        .filter_map(|cap| cap.get(1).or_else(|| cap.get(2)).or_else(|| cap.get(3)))
        .map(|m| m.as_str().trim())
        .filter(|target| !target.is_empty())
        .collect()
}

/// Targets of every `@import` rule.
pub(crate) fn import_targets(css: &str) -> Vec<&str> {
    IMPORT_RE
        .captures_iter(css)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Scan one chunk of CSS (a stylesheet, a `<style>` body, or the contents of
/// a `style` attribute) into `inventory`.
pub fn scan_css(css: &str, inventory: &mut StyleInventory) {
    let css = strip_comments(css);
    for declaration in declarations(&css) {
        if declaration.property == "font-family" {
            inventory.fonts.extend(font_families(declaration.value));
        }
        let without_urls = URL_FN_RE.replace_all(declaration.value, " ");
        inventory.colors.extend(
            COLOR_RE
                .find_iter(&without_urls)
                .map(|m| m.as_str().to_string()),
        );
    }
}

/// Names listed in a `font-family` value, quotes removed.
///
/// Generic families such as `sans-serif` are kept. Candidates that are
/// expressions (`var(--font)`) are skipped.
#[must_use]
pub fn font_families(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter_map(|candidate| {
            let mut name = candidate.trim();
            if let Some(index) = name.to_ascii_lowercase().find("!important") {
                name = name[..index].trim_end();
            }
            let name = name.trim_matches(|c| c == '"' || c == '\'').trim();
            if name.is_empty() || name.contains('(') {
                None
            } else {
                Some(name.to_string())
            }
        })
        .collect()
}

/// Colors and fonts from a page's inline styles, its `<style>` blocks, and
/// any externally fetched stylesheet bodies.
#[must_use]
pub fn analyze_styles(document: &SourceDocument, external_css: &[String]) -> StyleInventory {
    let html = Html::parse_document(document.raw_html());
    let mut inventory = StyleInventory::default();

    for element in html.select(&STYLED_SELECTOR) {
        if let Some(style) = element.value().attr("style") {
            scan_css(style, &mut inventory);
        }
    }
    for block in html.select(&STYLE_BLOCK_SELECTOR) {
        let css: String = block.text().collect();
        scan_css(&css, &mut inventory);
    }
    for css in external_css {
        scan_css(css, &mut inventory);
    }

    inventory
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use url::Url;

    fn scanned(css: &str) -> StyleInventory {
        let mut inventory = StyleInventory::default();
        scan_css(css, &mut inventory);
        inventory
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_extracts_hex_and_rgba() {
        let inventory = scanned("color: #FF0000; background: rgba(0, 0, 0, 0.5); color: #FF0000;");
        assert_eq!(inventory.colors, set(&["#FF0000", "rgba(0, 0, 0, 0.5)"]));
    }

    #[test]
    fn test_hex_lengths() {
        let inventory = scanned("a { color: #abc; border-color: #a1b2c3; outline-color: #11223344; fill: #abcd; }");
        assert_eq!(inventory.colors, set(&["#11223344", "#a1b2c3", "#abc"]));
    }

    #[test]
    fn test_hex_case_is_preserved() {
        let inventory = scanned("a { color: #fff } b { color: #FFF }");
        assert_eq!(inventory.colors, set(&["#FFF", "#fff"]));
    }

    #[test]
    fn test_functional_notations() {
        let inventory = scanned(
            "a { color: rgb(255,0,0); background: RGB(1 2 3 / 50%); border-color: hsl(120, 100%, 50%); \
             outline-color: hsla(210deg 40% 30% / .8); }",
        );
        assert_eq!(
            inventory.colors,
            set(&[
                "RGB(1 2 3 / 50%)",
                "hsl(120, 100%, 50%)",
                "hsla(210deg 40% 30% / .8)",
                "rgb(255,0,0)",
            ])
        );
    }

    #[test]
    fn test_malformed_colors_are_discarded() {
        let inventory = scanned("a { color: rgb(255, 0); background: hsl(10, 20, 30); fill: #12; }");
        assert!(inventory.colors.is_empty(), "{:?}", inventory.colors);
    }

    #[test]
    fn test_selectors_and_urls_are_not_colors() {
        let inventory = scanned("#nav { background: url(img/sprite.svg#fab) } #fff { margin: 0 }");
        assert!(inventory.colors.is_empty(), "{:?}", inventory.colors);
    }

    #[test]
    fn test_comments_are_ignored() {
        let inventory = scanned("a { /* color: #123456; */ color: #654321; }");
        assert_eq!(inventory.colors, set(&["#654321"]));
    }

    #[test]
    fn test_font_family_list() {
        let inventory = scanned("body { font-family: 'Inter', Arial, sans-serif; }");
        assert_eq!(inventory.fonts, set(&["Arial", "Inter", "sans-serif"]));
    }

    #[test]
    fn test_font_face_and_important() {
        let inventory = scanned(
            "@font-face { font-family: \"Brand Sans\"; src: url(brand.woff2); }\n\
             h1 { FONT-FAMILY: Georgia !important; }\n\
             p { font-family: var(--body-font), serif; }",
        );
        assert_eq!(inventory.fonts, set(&["Brand Sans", "Georgia", "serif"]));
    }

    #[test]
    fn test_url_targets_handle_quoting() {
        let targets = url_targets(r#"url("a.png"), url('b.png'), url( c.png ), url()"#);
        assert_eq!(targets, vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn test_import_targets() {
        let css = "@import \"reset.css\";\n@import url(theme.css) screen;\n@IMPORT url('print.css');";
        assert_eq!(import_targets(css), vec!["reset.css", "theme.css", "print.css"]);
    }

    #[test]
    fn test_analyze_styles_covers_all_sources() {
        let html = r#"<html><head>
            <style>h1 { color: #111111; font-family: Lato; }</style>
            </head><body>
            <p style="color: rgb(1, 2, 3); font-family: 'Open Sans'">x</p>
            </body></html>"#;
        let document = SourceDocument::new(Url::parse("https://a.com/").unwrap(), html.to_string());
        let external = vec!["body { background-color: #222; font-family: Roboto }".to_string()];

        let inventory = analyze_styles(&document, &external);

        assert_eq!(inventory.colors, set(&["#111111", "#222", "rgb(1, 2, 3)"]));
        assert_eq!(inventory.fonts, set(&["Lato", "Open Sans", "Roboto"]));
    }

    #[test]
    fn test_analyze_styles_without_external_css() {
        let document = SourceDocument::new(
            Url::parse("https://a.com/").unwrap(),
            "<div style=\"color:#0f0\"></div>".to_string(),
        );
        let inventory = analyze_styles(&document, &[]);
        assert_eq!(inventory.colors, set(&["#0f0"]));
        assert!(inventory.fonts.is_empty());
    }

    proptest! {
        #[test]
        fn test_scan_never_panics(css in r"\PC{0,200}") {
            let _ = scanned(&css);
        }

        #[test]
        fn test_every_color_is_in_input(css in r"[#a-fA-F0-9rgbhsl(),%/ .:;{}]{0,80}") {
            for color in scanned(&css).colors {
                prop_assert!(css.contains(&color));
            }
        }
    }
}
