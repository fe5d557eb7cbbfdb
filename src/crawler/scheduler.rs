//! Worker pool for a crawl session
//!
//! This module handles:
//! - The loop every worker runs: dequeue, fetch, hand off, expand
//! - Enforcing the depth bound on both dequeue and enqueue
//! - Isolating the page callback so a panic cannot take a worker down
//! - The per-worker politeness delay between fetches

use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{Frontier, Task};
use crate::crawler::parser::extract_links;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Callback invoked with `(url, html, depth)` for every fetched page
///
/// Receives the raw markup. Implementations handle their own errors.
pub type PageCallback = Arc<dyn Fn(&str, &str, u32) + Send + Sync>;

/// Everything the workers of one session share
pub struct Scheduler {
    frontier: Frontier,
    fetcher: Fetcher,
    on_page: PageCallback,
    allowed_host: String,
    max_depth: u32,
    poll_interval: Duration,
    politeness_delay: Duration,
    pages_fetched: AtomicUsize,
    #[cfg(test)]
    expand_hook: Option<PageCallback>,
}

impl Scheduler {
    /// Creates the shared worker state for one session
    ///
    /// # Arguments
    ///
    /// * `frontier` - Frontier already seeded for this session
    /// * `fetcher` - HTTP fetcher
    /// * `on_page` - Callback receiving each fetched page
    /// * `allowed_host` - The only host links may point at
    /// * `max_depth` - Deepest level that will be fetched
    /// * `poll_interval` - Upper bound on how long an idle worker waits
    /// * `politeness_delay` - Pause after each processed task
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        frontier: Frontier,
        fetcher: Fetcher,
        on_page: PageCallback,
        allowed_host: String,
        max_depth: u32,
        poll_interval: Duration,
        politeness_delay: Duration,
    ) -> Self {
        Self {
            frontier,
            fetcher,
            on_page,
            allowed_host,
            max_depth,
            poll_interval,
            politeness_delay,
            pages_fetched: AtomicUsize::new(0),
            #[cfg(test)]
            expand_hook: None,
        }
    }

    /// Spawns `count` identical workers onto the given join set
    pub fn spawn_workers(self: &Arc<Self>, count: usize, workers: &mut JoinSet<()>) {
        for id in 0..count {
            workers.spawn(Arc::clone(self).run_worker(id));
        }
    }

    /// Number of pages that produced content so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched.load(Ordering::SeqCst)
    }

    /// Runs one worker until the frontier stops
    async fn run_worker(self: Arc<Self>, id: usize) {
        tracing::debug!("Worker {} started", id);

        loop {
            if self.frontier.is_stopping() {
                break;
            }

            let Some(active) = self.frontier.dequeue(self.poll_interval).await else {
                break;
            };

            if self.frontier.is_stopping() {
                break;
            }

            if active.depth() > self.max_depth {
                tracing::debug!("Discarding {} beyond max depth", active.url());
                continue;
            }

            // A panic while processing ends only this task, never the worker
            let scheduler = Arc::clone(&self);
            let task = active.task().clone();
            if let Err(e) = tokio::spawn(async move { scheduler.process(&task).await }).await {
                tracing::error!("Worker {} failed while processing {}: {}", id, active.url(), e);
            }
            drop(active);

            if !self.politeness_delay.is_zero() {
                tokio::time::sleep(self.politeness_delay).await;
            }
        }

        tracing::debug!("Worker {} exiting", id);
    }

    /// Fetches one task, hands the page to the callback and queues its links
    async fn process(&self, task: &Task) {
        let url = task.url.as_str();
        let depth = task.depth;

        let Some(page) = self.fetcher.download(url).await else {
            return;
        };

        if page.body.is_empty() {
            tracing::debug!("Empty body from {}", url);
            return;
        }

        self.pages_fetched.fetch_add(1, Ordering::SeqCst);
        tracing::info!(
            "Fetched {} (depth {}, {} bytes)",
            url,
            depth,
            page.body.len()
        );

        let on_page = &self.on_page;
        if catch_unwind(AssertUnwindSafe(|| on_page(url, &page.body, depth))).is_err() {
            tracing::error!("Page callback panicked while handling {}", url);
        }

        self.expand(url, &page.body, depth);
    }

    /// Queues the same-host links of a page one level deeper
    fn expand(&self, url: &str, html: &str, depth: u32) {
        #[cfg(test)]
        if let Some(hook) = &self.expand_hook {
            hook(url, html, depth);
        }

        let next_depth = depth + 1;
        if next_depth > self.max_depth {
            return;
        }

        // Links come back absolute, resolved against the page URL
        let mut queued = 0;
        for link in extract_links(html, url) {
            if self
                .frontier
                .try_enqueue(&link, next_depth, &self.allowed_host)
            {
                queued += 1;
            }
        }

        tracing::debug!("Queued {} new links from {}", queued, url);
    }
}
