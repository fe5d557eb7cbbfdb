//! TOML configuration for a crawl-and-serve run
//!
//! Every section falls back to defaults; only crawling needs the
//! `[crawler]` `start-url`. Every loaded configuration is validated before
//! use.
//!
//! # Example
//!
//! ```no_run
//! use sitespider::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!(
//!     "Crawling {} with {} workers, serving on port {}",
//!     config.crawler.start_url, config.crawler.workers, config.server.port
//! );
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, ServerConfig, StorageConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_or_default, load_config_with_hash,
    parse_config,
};
