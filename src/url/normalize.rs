use super::has_http_scheme;

/// A URL split into its scheme, host and path components
///
/// The host keeps any `:port` suffix; use [`super::extract_host`] for the
/// bare host name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUrl {
    pub scheme: String,
    pub host: String,
    pub path: String,
}

/// Splits a URL into scheme, host and path
///
/// The split happens at the first `://`. Without one, the whole input is
/// treated as a path and scheme and host are empty. The host runs up to the
/// first `/` after the separator; a missing path becomes `/`.
///
/// # Examples
///
/// ```
/// use sitespider::url::parse_url;
///
/// let parsed = parse_url("https://example.com/a/b?q=1");
/// assert_eq!(parsed.scheme, "https");
/// assert_eq!(parsed.host, "example.com");
/// assert_eq!(parsed.path, "/a/b?q=1");
///
/// let parsed = parse_url("docs/index.html");
/// assert_eq!(parsed.scheme, "");
/// assert_eq!(parsed.path, "docs/index.html");
/// ```
pub fn parse_url(url: &str) -> ParsedUrl {
    let Some((scheme, rest)) = url.split_once("://") else {
        return ParsedUrl {
            path: url.to_string(),
            ..ParsedUrl::default()
        };
    };

    let (host, path) = match rest.find('/') {
        Some(slash) => (&rest[..slash], &rest[slash..]),
        None => (rest, "/"),
    };

    ParsedUrl {
        scheme: scheme.to_string(),
        host: host.to_string(),
        path: path.to_string(),
    }
}

/// Resolves an href found on `base` into an absolute URL
///
/// # Resolution Rules
///
/// 1. `http://` or `https://` hrefs are returned unchanged
/// 2. `//host/path` inherits the scheme of `base`
/// 3. `/path` is joined to the scheme and host of `base`
/// 4. Anything else is relative to the directory of `base`'s path, with
///    `.` and empty segments dropped and `..` popping one segment (never
///    past the root)
///
/// A base without a scheme is treated as `http`.
///
/// # Examples
///
/// ```
/// use sitespider::url::resolve;
///
/// assert_eq!(resolve("http://a.com/x/y", "z"), "http://a.com/x/z");
/// assert_eq!(resolve("http://a.com/x/y/", "../z"), "http://a.com/x/z");
/// assert_eq!(resolve("http://a.com/x", "/abs"), "http://a.com/abs");
/// assert_eq!(resolve("http://a.com/x", "//b.com/y"), "http://b.com/y");
/// assert_eq!(resolve("http://a.com/x", "https://c.com/y"), "https://c.com/y");
/// ```
pub fn resolve(base: &str, href: &str) -> String {
    if has_http_scheme(href) {
        return href.to_string();
    }

    let parsed = parse_url(base);
    let scheme = if parsed.scheme.is_empty() {
        "http"
    } else {
        parsed.scheme.as_str()
    };

    if href.starts_with("//") {
        return format!("{}:{}", scheme, href);
    }

    if href.starts_with('/') {
        return format!("{}://{}{}", scheme, parsed.host, href);
    }

    let directory = match parsed.path.rfind('/') {
        Some(slash) => &parsed.path[..=slash],
        None => "/",
    };
    let combined = format!("{}{}", directory, href);

    format!("{}://{}{}", scheme, parsed.host, collapse_segments(&combined))
}

/// Collapses `.`, `..` and empty segments of a path
fn collapse_segments(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}
