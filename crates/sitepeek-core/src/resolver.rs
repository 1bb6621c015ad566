//! Resolution of raw attribute values into absolute asset URLs.
//!
//! Pure URL algebra on top of the `url` crate: no network access and no
//! ambient state. The base URL is always an explicit argument so concurrent
//! analyses of different pages cannot interfere.
//!
//! ```rust
//! use sitepeek_core::resolve;
//! use url::Url;
//!
//! let base = Url::parse("https://a.com/dir/page.html")?;
//! assert_eq!(resolve(&base, "../x.css")?.as_str(), "https://a.com/x.css");
//! assert_eq!(resolve(&base, "//cdn.com/f.js")?.as_str(), "https://cdn.com/f.js");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use url::Url;

use crate::{Error, Result};

/// Schemes that never name a fetchable asset.
const PSEUDO_SCHEMES: &[&str] = &["javascript:", "data:", "mailto:", "tel:", "blob:", "about:"];

/// Resolve `reference` against `base`.
///
/// - Absolute http(s) URLs are returned normalized (lowercase scheme and host,
///   default port removed).
/// - Scheme-relative references (`//host/path`) inherit the base scheme.
/// - Path-relative references follow RFC 3986 resolution: `.` and `..`
///   segments collapse, query and fragment come from the reference.
///
/// # Errors
///
/// [`Error::InvalidReference`] for empty or fragment-only references, pseudo
/// schemes such as `javascript:` and `data:`, non-http(s) results, and
/// anything the URL parser rejects.
pub fn resolve(base: &Url, reference: &str) -> Result<Url> {
    let reference = reference.trim();

    if reference.is_empty() {
        return Err(Error::InvalidReference("empty reference".to_string()));
    }
    if reference.starts_with('#') {
        return Err(Error::InvalidReference(format!(
            "'{reference}' only names a fragment of the page"
        )));
    }

    let lowered = reference.to_ascii_lowercase();
    if let Some(scheme) = PSEUDO_SCHEMES.iter().find(|s| lowered.starts_with(**s)) {
        return Err(Error::InvalidReference(format!(
            "'{scheme}' references are not assets"
        )));
    }

    let resolved = base
        .join(reference)
        .map_err(|e| Error::InvalidReference(format!("'{reference}': {e}")))?;

    match resolved.scheme() {
        "http" | "https" if resolved.host_str().is_some() => Ok(resolved),
        other => Err(Error::InvalidReference(format!(
            "'{reference}' resolves to unsupported scheme '{other}'"
        ))),
    }
}

/// Parse a caller-supplied page URL.
///
/// Bare hosts such as `example.com/docs` are accepted and assumed to be https.
///
/// # Errors
///
/// [`Error::InvalidUrl`] when the input is empty, malformed, or not http(s).
pub fn parse_page_url(input: &str) -> Result<Url> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::InvalidUrl("empty URL".to_string()));
    }

    let parsed = match Url::parse(input) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{input}"))
            .map_err(|e| Error::InvalidUrl(format!("'{input}': {e}")))?,
        Err(e) => return Err(Error::InvalidUrl(format!("'{input}': {e}"))),
    };

    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(Error::InvalidUrl(format!(
            "'{input}' is not an http(s) URL"
        )));
    }
    Ok(parsed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn base() -> Url {
        Url::parse("https://a.com/dir/page.html").unwrap()
    }

    fn resolved(reference: &str) -> String {
        resolve(&base(), reference).unwrap().to_string()
    }

    #[test]
    fn test_relative_references() {
        assert_eq!(resolved("../x.css"), "https://a.com/x.css");
        assert_eq!(resolved("/y.js"), "https://a.com/y.js");
        assert_eq!(resolved("z.png"), "https://a.com/dir/z.png");
        assert_eq!(resolved("./sub/../z.png"), "https://a.com/dir/z.png");
        assert_eq!(resolved("//cdn.com/f.js"), "https://cdn.com/f.js");
    }

    #[test]
    fn test_absolute_references_are_normalized() {
        assert_eq!(resolved("HTTPS://CDN.Example.COM:443/Lib.js"), "https://cdn.example.com/Lib.js");
        assert_eq!(resolved("http://a.com:80/x"), "http://a.com/x");
        assert_eq!(resolved("http://a.com:8080/x"), "http://a.com:8080/x");
    }

    #[test]
    fn test_query_and_fragment_come_from_reference() {
        let base = Url::parse("https://a.com/dir/page.html?page=1#top").unwrap();
        assert_eq!(
            resolve(&base, "app.css?v=3#x").unwrap().as_str(),
            "https://a.com/dir/app.css?v=3#x"
        );
        assert_eq!(resolve(&base, "app.css").unwrap().as_str(), "https://a.com/dir/app.css");
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(resolved("  \n logo.svg \t"), "https://a.com/dir/logo.svg");
    }

    #[test]
    fn test_rejected_references() {
        for reference in [
            "",
            "   ",
            "#section",
            "javascript:void(0)",
            "JavaScript:alert(1)",
            "data:image/png;base64,AAAA",
            "mailto:someone@example.com",
            "tel:+15555555",
            "ftp://files.example.com/a.zip",
            "http://[::1",
        ] {
            assert!(
                matches!(resolve(&base(), reference), Err(Error::InvalidReference(_))),
                "expected '{reference}' to be rejected"
            );
        }
    }

    #[test]
    fn test_parse_page_url() {
        assert_eq!(parse_page_url("https://Example.com").unwrap().as_str(), "https://example.com/");
        assert_eq!(parse_page_url("example.com/docs").unwrap().as_str(), "https://example.com/docs");
        assert!(matches!(parse_page_url(""), Err(Error::InvalidUrl(_))));
        assert!(matches!(parse_page_url("file:///etc/passwd"), Err(Error::InvalidUrl(_))));
        assert!(matches!(parse_page_url("http://"), Err(Error::InvalidUrl(_))));
    }

    proptest! {
        #[test]
        fn test_resolve_never_panics(reference in r"\PC{0,64}") {
            let _ = resolve(&base(), &reference);
        }

        #[test]
        fn test_resolved_urls_are_http(segment in "[a-z0-9_.-]{1,12}") {
            if let Ok(url) = resolve(&base(), &segment) {
                prop_assert!(matches!(url.scheme(), "http" | "https"));
                prop_assert_eq!(url.host_str(), Some("a.com"));
            }
        }
    }
}
