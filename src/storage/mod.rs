//! Storage module for the search index
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Document and word frequency persistence
//! - Ranked conjunctive search
//! - Counters for index statistics

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use std::path::Path;
use std::sync::{Arc, Mutex};

/// Storage shared between the crawler's page callback and the front end
pub type SharedStorage = Arc<Mutex<dyn Storage + Send>>;

/// Maximum number of results returned by a search
pub const MAX_SEARCH_RESULTS: usize = 10;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// A document matching a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub url: String,

    /// Sum of the frequencies of the query words in this document
    pub relevance: i64,
}
