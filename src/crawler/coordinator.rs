//! Crawl controller - session lifecycle and termination
//!
//! This module contains the entry point of a crawl session, including:
//! - Building a fresh session and seeding the frontier
//! - Spawning the worker pool
//! - Watching for quiescence, the duration ceiling or an external stop
//! - Stopping and joining every worker before returning

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::scheduler::{PageCallback, Scheduler};
use crate::url::extract_host;
use crate::SpiderError;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Why a crawl session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Nothing queued and no worker busy
    Quiescent,
    /// The duration ceiling elapsed first
    DeadlineReached,
    /// A [`StopHandle`] was triggered
    Interrupted,
}

/// Outcome of one crawl session
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// Pages fetched with content and handed to the callback
    pub pages_fetched: usize,

    /// Distinct URLs accepted into the frontier, the seed included
    pub urls_discovered: usize,

    pub elapsed: Duration,

    pub stop_reason: StopReason,
}

/// Requests that a running crawl shuts down
///
/// The controller notices the request on its next poll and stops the
/// workers the same way it does for quiescence.
#[derive(Debug, Clone)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }
}

/// State of one crawl, built fresh for every call to [`Crawler::crawl`]
#[derive(Debug)]
struct CrawlSession {
    allowed_host: String,
    max_depth: u32,
    started_at: DateTime<Utc>,
    started: Instant,
}

/// Domain-scoped crawler
pub struct Crawler {
    fetcher: Fetcher,
    frontier: Frontier,
    stop_requested: Arc<AtomicBool>,
    poll_interval: Duration,
    max_duration: Duration,
    politeness_delay: Duration,
}

impl Crawler {
    /// Creates a crawler from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Crawler timing and limit settings
    /// * `user_agent` - Identification sent with every request
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to crawl
    /// * `Err(SpiderError)` - The HTTP client could not be built
    pub fn new(config: &CrawlerConfig, user_agent: &UserAgentConfig) -> Result<Self, SpiderError> {
        let fetcher = Fetcher::new(config, user_agent)?;
        Ok(Self::with_fetcher(fetcher, config))
    }

    /// Creates a crawler around an existing fetcher
    pub fn with_fetcher(fetcher: Fetcher, config: &CrawlerConfig) -> Self {
        Self {
            fetcher,
            frontier: Frontier::new(),
            stop_requested: Arc::new(AtomicBool::new(false)),
            poll_interval: config.poll_interval(),
            max_duration: config.max_duration(),
            politeness_delay: config.politeness_delay(),
        }
    }

    /// Returns a handle that can stop a running crawl from another task
    ///
    /// A stop requested before [`Crawler::crawl`] starts is discarded.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            requested: Arc::clone(&self.stop_requested),
        }
    }

    /// The frontier of the current or most recent session
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Crawls the site of `seed_url` down to `max_depth`
    ///
    /// The seed is depth 1; a `max_depth` below 1 crawls nothing. Only URLs
    /// on the seed's host are followed. Returns once every worker has
    /// exited.
    ///
    /// # Errors
    ///
    /// `SpiderError::InvalidSeed` if the seed has no host. Individual fetch
    /// failures are logged and never abort the session.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sitespider::config::{CrawlerConfig, UserAgentConfig};
    /// use sitespider::crawler::{Crawler, PageCallback};
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = CrawlerConfig::with_start_url("https://example.com/");
    /// let mut crawler = Crawler::new(&config, &UserAgentConfig::default())?;
    /// let on_page: PageCallback = Arc::new(|url: &str, _html: &str, depth: u32| {
    ///     println!("{} at depth {}", url, depth);
    /// });
    /// let summary = crawler.crawl(&config.start_url, 2, 4, on_page).await?;
    /// println!("{} pages", summary.pages_fetched);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crawl(
        &mut self,
        seed_url: &str,
        max_depth: u32,
        num_workers: usize,
        on_page: PageCallback,
    ) -> Result<CrawlSummary, SpiderError> {
        let started = Instant::now();

        if max_depth < 1 {
            tracing::info!("Max depth is {}, nothing to crawl", max_depth);
            return Ok(CrawlSummary {
                pages_fetched: 0,
                urls_discovered: 0,
                elapsed: started.elapsed(),
                stop_reason: StopReason::Quiescent,
            });
        }

        let num_workers = num_workers.max(1);

        self.frontier.reset();
        self.stop_requested.store(false, Ordering::SeqCst);

        let allowed_host = extract_host(seed_url);
        if allowed_host.is_empty() {
            return Err(SpiderError::InvalidSeed {
                url: seed_url.to_string(),
            });
        }

        let session = CrawlSession {
            allowed_host,
            max_depth,
            started_at: Utc::now(),
            started,
        };

        tracing::info!(
            "Starting crawl of {} at {} (host {}, max depth {}, {} workers)",
            seed_url,
            session.started_at.to_rfc3339(),
            session.allowed_host,
            session.max_depth,
            num_workers
        );

        if !self
            .frontier
            .try_enqueue(seed_url, 1, &session.allowed_host)
        {
            tracing::warn!("Seed URL {} was rejected by the frontier", seed_url);
        }

        let scheduler = Arc::new(Scheduler::new(
            self.frontier.clone(),
            self.fetcher.clone(),
            on_page,
            session.allowed_host.clone(),
            session.max_depth,
            self.poll_interval,
            self.politeness_delay,
        ));

        let mut workers = JoinSet::new();
        scheduler.spawn_workers(num_workers, &mut workers);

        let stop_reason = self.monitor(&session).await;
        tracing::info!("Stopping crawl: {:?}", stop_reason);

        self.frontier.stop();
        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                tracing::error!("Worker task failed: {}", e);
            }
        }

        let summary = CrawlSummary {
            pages_fetched: scheduler.pages_fetched(),
            urls_discovered: self.frontier.visited_count(),
            elapsed: session.started.elapsed(),
            stop_reason,
        };

        tracing::info!(
            "Crawl completed: {} pages fetched, {} URLs discovered in {:?}",
            summary.pages_fetched,
            summary.urls_discovered,
            summary.elapsed
        );

        Ok(summary)
    }

    /// Polls until one of the termination triggers fires
    async fn monitor(&self, session: &CrawlSession) -> StopReason {
        loop {
            tokio::time::sleep(self.poll_interval).await;

            if self.stop_requested.load(Ordering::SeqCst) {
                return StopReason::Interrupted;
            }

            if self.frontier.is_quiescent() {
                return StopReason::Quiescent;
            }

            if session.started.elapsed() >= self.max_duration {
                tracing::warn!(
                    "Crawl duration ceiling of {:?} reached with {} URLs queued",
                    self.max_duration,
                    self.frontier.queued_count()
                );
                return StopReason::DeadlineReached;
            }

            tracing::trace!(
                "{} queued, {} active, {} visited",
                self.frontier.queued_count(),
                self.frontier.active_count(),
                self.frontier.visited_count()
            );
        }
    }
}
