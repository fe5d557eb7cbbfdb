use crate::ConfigError;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sitespider
///
/// Every section may be omitted. The defaults serve and query an existing
/// index; crawling additionally needs `start-url`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Seed URL; also defines the only host that will be crawled
    ///
    /// Empty when not configured.
    #[serde(default)]
    pub start_url: String,

    /// Maximum depth to crawl, the seed being depth 1
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of concurrent workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Timeout for connecting to and reading from a host (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How often idle workers and the controller re-check state (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Hard ceiling on the length of one crawl session (seconds)
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u64,

    /// Pause each worker takes after every fetch (milliseconds)
    #[serde(default = "default_politeness_delay_ms")]
    pub politeness_delay_ms: u64,

    /// Maximum number of redirects followed for one fetch
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Largest response body accepted (bytes)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl CrawlerConfig {
    /// Creates a crawler configuration with default settings for the given seed
    pub fn with_start_url(start_url: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            max_depth: default_max_depth(),
            workers: default_workers(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            max_duration_secs: default_max_duration_secs(),
            politeness_delay_ms: default_politeness_delay_ms(),
            max_redirects: default_max_redirects(),
            max_body_bytes: default_max_body_bytes(),
        }
    }

    /// The seed URL, or an error when none is configured
    pub fn seed(&self) -> Result<&str, ConfigError> {
        if self.start_url.is_empty() {
            return Err(ConfigError::Validation(
                "crawler start-url is required to crawl".to_string(),
            ));
        }
        Ok(&self.start_url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self::with_start_url(String::new())
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,

    /// Email address for crawler-related contact
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SpiderBot".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "http://example.com/bot".to_string(),
            contact_email: "bot@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Index storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Query front end configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Address to listen on
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_max_depth() -> u32 {
    2
}

fn default_workers() -> usize {
    4
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_max_duration_secs() -> u64 {
    600
}

fn default_politeness_delay_ms() -> u64 {
    100
}

fn default_max_redirects() -> u32 {
    5
}

fn default_max_body_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_database_path() -> String {
    "./index.db".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}
