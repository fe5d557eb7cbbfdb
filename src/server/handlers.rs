//! Request handlers for the query front end

use crate::server::pages::{error_page, results_page, INDEX_PAGE};
use crate::server::AppState;
use crate::storage::StorageError;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use thiserror::Error;

/// Most words a query may contain
pub const MAX_QUERY_WORDS: usize = 4;

/// Failures rendered as HTML error pages
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("A query must contain between 1 and {max} words, got {count}")]
    InvalidQuery { count: usize, max: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, title) = match self {
            Self::InvalidQuery { .. } => (StatusCode::BAD_REQUEST, "Invalid query"),
            Self::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        (status, Html(error_page(title, &self.to_string()))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub query: String,
}

/// Splits a query into lowercase alphanumeric words
///
/// # Example
///
/// ```
/// use sitespider::server::split_query;
///
/// assert_eq!(split_query("Rust, Web-Crawler!"), vec!["rust", "web", "crawler"]);
/// ```
pub fn split_query(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

pub async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>, ServerError> {
    let words = split_query(&form.query);

    if words.is_empty() || words.len() > MAX_QUERY_WORDS {
        return Err(ServerError::InvalidQuery {
            count: words.len(),
            max: MAX_QUERY_WORDS,
        });
    }

    let results = state.search(&words)?;
    tracing::info!("Query {:?} matched {} documents", words, results.len());

    Ok(Html(results_page(&form.query, &results)))
}

pub async fn not_found() -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        Html(error_page("Not found", "No such page.")),
    )
}
