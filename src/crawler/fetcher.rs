//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - GET requests to fetch page content
//! - Manual redirect handling with a per-fetch hop budget
//! - Status, Content-Type and body size gating
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::url::{has_http_scheme, resolve};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Content types accepted as crawlable HTML
pub const ACCEPTED_CONTENT_TYPES: &[&str] = &["text/html", "text/xhtml", "application/xhtml+xml"];

/// A successfully fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value (empty if the server sent none)
    pub content_type: String,

    /// Page body, decoded as UTF-8 with invalid sequences replaced
    pub body: String,
}

/// Reasons a fetch produced no content
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Malformed URL: {url}")]
    MalformedUrl { url: String },

    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP status {status_code} for {url}")]
    Status { url: String, status_code: u16 },

    #[error("Skipping non-HTML content at {url}: {content_type}")]
    ContentType { url: String, content_type: String },

    #[error("Response too large for {url}: {size} bytes (limit {limit})")]
    TooLarge { url: String, size: u64, limit: usize },

    #[error("Too many redirects from {url} ({hops} hops)")]
    RedirectLimit { url: String, hops: u32 },
}

/// Broad classes of fetch failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The URL lacks a usable scheme or cannot be turned into a request
    MalformedUrl,
    /// DNS, connect, TLS, read/write or timeout failure
    NetworkFailure,
    /// The server answered, but not with acceptable content
    ProtocolReject,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::MalformedUrl { .. } => FetchErrorKind::MalformedUrl,
            Self::Network { .. } => FetchErrorKind::NetworkFailure,
            Self::Status { .. }
            | Self::ContentType { .. }
            | Self::TooLarge { .. }
            | Self::RedirectLimit { .. } => FetchErrorKind::ProtocolReject,
        }
    }

    /// Classifies a reqwest error raised while sending or reading
    fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_builder() {
            Self::MalformedUrl {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Outcome of a single request in a redirect chain
enum Hop {
    Redirect(String),
    Done(FetchedPage),
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are not followed by the client; [`Fetcher`] follows them
/// itself so the hop count stays local to each fetch. TLS uses rustls with
/// certificate verification enabled.
///
/// # Example
///
/// ```no_run
/// use sitespider::config::UserAgentConfig;
/// use sitespider::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-us,en;q=0.5"),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static("close"));

    Client::builder()
        .user_agent(user_agent.header_value())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::none()) // Handle redirects manually
        .use_rustls_tls()
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches single pages for the crawl workers
///
/// Cloning is cheap: the underlying client is reference counted.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_redirects: u32,
    max_body_bytes: usize,
}

impl Fetcher {
    /// Creates a fetcher from the crawler and user agent configuration
    pub fn new(config: &CrawlerConfig, user_agent: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, config.request_timeout())?;
        Ok(Self::with_client(client, config.max_redirects, config.max_body_bytes))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, max_redirects: u32, max_body_bytes: usize) -> Self {
        Self {
            client,
            max_redirects,
            max_body_bytes,
        }
    }

    /// Fetches a URL, following redirects
    ///
    /// # Request Flow
    ///
    /// 1. Reject URLs without an `http://` or `https://` scheme
    /// 2. Send GET (bounded by the client timeout)
    /// 3. On 301/302/303/307/308 with a `Location`, resolve it against the
    ///    current URL and repeat with one more hop
    /// 4. Reject non-2xx, non-HTML and oversized responses
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | No scheme | `MalformedUrl` |
    /// | DNS / connect / TLS / timeout | `Network` |
    /// | More than `max_redirects` redirects | `RedirectLimit` |
    /// | Non-2xx terminal status | `Status` |
    /// | Content-Type not HTML | `ContentType` |
    /// | Body over the size cap | `TooLarge` |
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut current = url.to_string();
        let mut hops = 0;

        loop {
            match self.fetch_hop(&current, hops).await? {
                Hop::Redirect(next) => {
                    current = next;
                    hops += 1;
                }
                Hop::Done(page) => return Ok(page),
            }
        }
    }

    /// Fetches a URL, converting every failure into `None`
    ///
    /// This is the boundary the workers use: failures are logged here and
    /// the task is dropped by the caller.
    pub async fn download(&self, url: &str) -> Option<FetchedPage> {
        match self.fetch(url).await {
            Ok(page) => Some(page),
            Err(e) => {
                match e.kind() {
                    FetchErrorKind::NetworkFailure => tracing::warn!("{}", e),
                    FetchErrorKind::MalformedUrl | FetchErrorKind::ProtocolReject => {
                        tracing::info!("{}", e)
                    }
                }
                None
            }
        }
    }

    /// Performs one request of a redirect chain; `hops` redirects have
    /// already been followed to reach `url`
    async fn fetch_hop(&self, url: &str, hops: u32) -> Result<Hop, FetchError> {
        if !has_http_scheme(url) {
            return Err(FetchError::MalformedUrl {
                url: url.to_string(),
            });
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();

        if is_redirect(status) {
            if let Some(location) = location_header(&response) {
                if hops >= self.max_redirects {
                    return Err(FetchError::RedirectLimit {
                        url: url.to_string(),
                        hops,
                    });
                }

                let next = resolve(url, &location);
                tracing::debug!("Redirect from {} to {}", url, next);
                return Ok(Hop::Redirect(next));
            }
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status_code: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.is_empty() && !is_html_content_type(&content_type) {
            return Err(FetchError::ContentType {
                url: url.to_string(),
                content_type,
            });
        }

        if let Some(declared) = response.content_length() {
            if declared > self.max_body_bytes as u64 {
                return Err(FetchError::TooLarge {
                    url: url.to_string(),
                    size: declared,
                    limit: self.max_body_bytes,
                });
            }
        }

        let body = self.read_body(url, response).await?;

        Ok(Hop::Done(FetchedPage {
            url: url.to_string(),
            status_code: status.as_u16(),
            content_type,
            body,
        }))
    }

    /// Streams the body, giving up as soon as it crosses the size cap
    async fn read_body(&self, url: &str, mut response: Response) -> Result<String, FetchError> {
        let mut bytes: Vec<u8> = Vec::new();

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?
        {
            let size = bytes.len() + chunk.len();
            if size > self.max_body_bytes {
                return Err(FetchError::TooLarge {
                    url: url.to_string(),
                    size: size as u64,
                    limit: self.max_body_bytes,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Returns true for the redirect statuses the fetcher follows
fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

fn location_header(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Checks a Content-Type header value against the accepted HTML family
pub fn is_html_content_type(content_type: &str) -> bool {
    let lowered = content_type.to_ascii_lowercase();
    ACCEPTED_CONTENT_TYPES
        .iter()
        .any(|accepted| lowered.contains(accepted))
}
