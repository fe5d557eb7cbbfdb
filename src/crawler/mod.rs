//! Crawler module for domain-scoped page fetching
//!
//! This module contains the crawl engine, including:
//! - HTTP fetching with manual redirect handling
//! - The shared frontier and visited-set
//! - HTML link extraction
//! - The worker pool and the controller that runs a session

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod scheduler;

pub use coordinator::{CrawlSummary, Crawler, StopHandle, StopReason};
pub use fetcher::{
    build_http_client, is_html_content_type, FetchError, FetchErrorKind, FetchedPage, Fetcher,
    ACCEPTED_CONTENT_TYPES,
};
pub use frontier::{ActiveTask, Frontier, Task, SKIPPED_EXTENSIONS};
pub use parser::extract_links;
pub use scheduler::{PageCallback, Scheduler};
