//! Sitespider: a domain-scoped crawler and search index
//!
//! This crate crawls a single web site with a bounded pool of workers,
//! indexes the term frequencies of every fetched page into SQLite and
//! answers ranked conjunctive-term queries over a small HTTP front end.

pub mod config;
pub mod crawler;
pub mod indexer;
pub mod output;
pub mod server;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sitespider operations
#[derive(Debug, Error)]
pub enum SpiderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Seed URL has no host to confine the crawl to: {url}")]
    InvalidSeed { url: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Sitespider operations
pub type Result<T> = std::result::Result<T, SpiderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Crawler, CrawlSummary, StopReason};
pub use url::{extract_host, is_allowed, parse_url, resolve};
