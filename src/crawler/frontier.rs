//! Crawl frontier: the shared queue of pending tasks and the visited-set
//!
//! This module handles:
//! - Deduplicated, domain-confined enqueueing
//! - Waiting dequeue with a bounded re-check interval
//! - Tracking how many workers are processing a task
//! - The stop flag that drains the worker pool

use crate::url::{has_http_scheme, is_allowed};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

/// Extensions of resources that are never worth fetching as HTML
pub const SKIPPED_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".mp4", ".avi", ".mov", ".wmv",
    ".mp3", ".wav", ".ogg", ".zip", ".rar", ".tar", ".gz", ".exe", ".dmg", ".iso",
];

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Absolute URL
    pub url: String,

    /// Link distance from the seed, the seed being 1
    pub depth: u32,
}

/// Queue and visited-set, guarded together
#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<Task>,
    visited: HashSet<String>,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<FrontierState>,
    active: AtomicUsize,
    stopping: AtomicBool,
    notify: Notify,
}

/// Shared crawl frontier
///
/// Cloning yields another handle to the same frontier.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    shared: Arc<Shared>,
}

/// A dequeued task that counts as in progress until dropped
#[derive(Debug)]
pub struct ActiveTask {
    task: Task,
    shared: Arc<Shared>,
}

impl ActiveTask {
    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn url(&self) -> &str {
        &self.task.url
    }

    pub fn depth(&self) -> u32 {
        self.task.depth
    }
}

impl Drop for ActiveTask {
    fn drop(&mut self) {
        self.shared.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a URL to the queue if it may be crawled and has not been seen
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL
    /// * `depth` - Depth the URL would be crawled at
    /// * `allowed_host` - The only host the crawl may visit
    ///
    /// # Returns
    ///
    /// `true` if the URL was queued; `false` if it was rejected, in which
    /// case the frontier is unchanged.
    pub fn try_enqueue(&self, url: &str, depth: u32, allowed_host: &str) -> bool {
        if !is_allowed(url, allowed_host) {
            tracing::trace!("Skipping off-site URL: {}", url);
            return false;
        }

        if !has_http_scheme(url) {
            tracing::trace!("Skipping non-HTTP URL: {}", url);
            return false;
        }

        if has_skipped_extension(url) {
            tracing::debug!("Skipping non-HTML resource: {}", url);
            return false;
        }

        {
            let mut state = self.lock();
            if !state.visited.insert(url.to_string()) {
                return false;
            }
            state.queue.push_back(Task {
                url: url.to_string(),
                depth,
            });
        }

        tracing::debug!("Queued {} at depth {}", url, depth);
        self.shared.notify.notify_one();
        true
    }

    /// Takes the next task, waiting for one to arrive if the queue is empty
    ///
    /// The wait re-checks the queue and the stop flag at least every
    /// `poll_interval`. Returns `None` only once the frontier is stopping
    /// and nothing is left to hand out.
    pub async fn dequeue(&self, poll_interval: Duration) -> Option<ActiveTask> {
        loop {
            {
                let mut state = self.lock();
                if let Some(task) = state.queue.pop_front() {
                    // Claimed while the lock is held so quiescence can never
                    // be observed between pop and claim
                    self.shared.active.fetch_add(1, Ordering::SeqCst);
                    return Some(ActiveTask {
                        task,
                        shared: Arc::clone(&self.shared),
                    });
                }
            }

            if self.is_stopping() {
                return None;
            }

            let _ = tokio::time::timeout(poll_interval, self.shared.notify.notified()).await;
        }
    }

    /// Clears the queue, the visited-set, the active counter and the stop flag
    pub fn reset(&self) {
        let mut state = self.lock();
        state.queue.clear();
        state.visited.clear();
        self.shared.active.store(0, Ordering::SeqCst);
        self.shared.stopping.store(false, Ordering::SeqCst);
    }

    /// Sets the stop flag and wakes every waiting worker
    pub fn stop(&self) {
        self.shared.stopping.store(true, Ordering::SeqCst);
        self.shared.notify.notify_waiters();
    }

    pub fn is_stopping(&self) -> bool {
        self.shared.stopping.load(Ordering::SeqCst)
    }

    /// True when nothing is queued and no worker holds a task
    pub fn is_quiescent(&self) -> bool {
        let state = self.lock();
        state.queue.is_empty() && self.shared.active.load(Ordering::SeqCst) == 0
    }

    /// Number of distinct URLs ever accepted since the last reset
    pub fn visited_count(&self) -> usize {
        self.lock().visited.len()
    }

    pub fn queued_count(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn active_count(&self) -> usize {
        self.shared.active.load(Ordering::SeqCst)
    }
}

/// Checks the URL against the extension denylist, ignoring case
fn has_skipped_extension(url: &str) -> bool {
    let lowered = url.to_ascii_lowercase();
    SKIPPED_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext))
}
