//! HTML link extraction
//!
//! This module scans fetched HTML for outbound `<a href>` links and turns
//! them into absolute URLs the frontier can consider.

use crate::url::{has_http_scheme, resolve};
use scraper::{Html, Selector};

/// Href prefixes that never point at a crawlable page
const IGNORED_PREFIXES: &[&str] = &["mailto:", "javascript:", "tel:"];

/// Extracts all followable links from an HTML document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document
///
/// **Exclude:**
/// - Empty hrefs and fragment-only hrefs (`#section`)
/// - `mailto:`, `javascript:` and `tel:` links, in any letter case
/// - Anything that does not resolve to an `http://` or `https://` URL
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The URL of the page, used to resolve relative links
///
/// # Returns
///
/// Absolute URLs, sorted and without duplicates
///
/// # Example
///
/// ```
/// use sitespider::crawler::extract_links;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let links = extract_links(html, "https://example.com/");
/// assert_eq!(links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn extract_links(html: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links: Vec<String> = document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect();

    links.sort();
    links.dedup();
    links
}

/// Resolves one href, returning None for links that should be skipped
fn resolve_link(href: &str, base_url: &str) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if IGNORED_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
    {
        return None;
    }

    let absolute = resolve(base_url, href);
    has_http_scheme(&absolute).then_some(absolute)
}
