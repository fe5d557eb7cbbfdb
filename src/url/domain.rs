/// Extracts the bare host from a URL string
///
/// Strips the scheme, everything from the first `/` after it, and any
/// `:port` suffix. Returns an empty string when the URL has no `://`.
///
/// # Examples
///
/// ```
/// use sitespider::url::extract_host;
///
/// assert_eq!(extract_host("https://example.com/path"), "example.com");
/// assert_eq!(extract_host("http://example.com:8080/"), "example.com");
/// assert_eq!(extract_host("/relative/path"), "");
/// ```
pub fn extract_host(url: &str) -> String {
    let Some((_, rest)) = url.split_once("://") else {
        return String::new();
    };

    let host_port = rest.split('/').next().unwrap_or_default();
    let host = host_port.split(':').next().unwrap_or_default();

    host.to_string()
}

/// Checks whether a URL belongs to the crawl's allowed host
///
/// This is an exact comparison: subdomains of the allowed host are
/// rejected, as are URLs with no recognizable host.
///
/// # Examples
///
/// ```
/// use sitespider::url::is_allowed;
///
/// assert!(is_allowed("https://example.com/a", "example.com"));
/// assert!(!is_allowed("https://blog.example.com/a", "example.com"));
/// ```
pub fn is_allowed(url: &str, allowed_host: &str) -> bool {
    extract_host(url) == allowed_host
}
