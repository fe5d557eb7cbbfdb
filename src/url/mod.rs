//! URL handling module for Sitespider
//!
//! This module provides string-level URL parsing and relative reference
//! resolution, plus the host extraction used to keep a crawl on one site.
//! Nothing here touches the network or returns an error: malformed input
//! degrades to empty fields.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_host, is_allowed};
pub use normalize::{parse_url, resolve, ParsedUrl};

/// Returns true if the URL starts with an `http://` or `https://` scheme
///
/// # Examples
///
/// ```
/// use sitespider::url::has_http_scheme;
///
/// assert!(has_http_scheme("https://example.com/"));
/// assert!(!has_http_scheme("ftp://example.com/"));
/// assert!(!has_http_scheme("/relative"));
/// ```
pub fn has_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
