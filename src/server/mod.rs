//! Query front end
//!
//! A small HTTP server over the search index:
//! - `GET /` serves the search form
//! - `POST /search` runs a query of 1 to 4 words and lists ranked results
//! - Anything else is a 404

mod handlers;
mod pages;

pub use handlers::{split_query, ServerError, MAX_QUERY_WORDS};
pub use pages::escape_html;

use crate::storage::{SearchResult, SharedStorage, StorageResult};
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::sync::PoisonError;
use tokio::net::TcpListener;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    storage: SharedStorage,
}

impl AppState {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    fn search(&self, words: &[String]) -> StorageResult<Vec<SearchResult>> {
        let storage = self.storage.lock().unwrap_or_else(PoisonError::into_inner);
        storage.search(words)
    }
}

pub fn create_router(storage: SharedStorage) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/search", post(handlers::search))
        .fallback(handlers::not_found)
        .with_state(AppState::new(storage))
}

/// Serves the front end on `listener` until `shutdown` completes
///
/// In-flight requests are allowed to finish once shutdown begins.
pub async fn serve<F>(
    listener: TcpListener,
    storage: SharedStorage,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Serving search front end on http://{}", addr);
    }

    axum::serve(listener, create_router(storage))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Completes when the process receives Ctrl-C or, on Unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Received shutdown signal");
}
