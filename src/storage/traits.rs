//! Storage traits and error types
//!
//! This module defines the trait interface for index storage backends and
//! associated error types.

use crate::storage::SearchResult;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for index storage implementations
///
/// The crawler's page callback writes through this trait and the query
/// front end reads through it. Implementations are not required to be
/// thread-safe; callers share them behind a mutex.
pub trait Storage {
    /// Creates the tables if they do not exist yet
    fn ensure_schema(&mut self) -> StorageResult<()>;

    // ===== Indexing =====

    /// Inserts a document or returns the ID of the existing one
    ///
    /// # Arguments
    ///
    /// * `url` - The page URL, which identifies the document
    ///
    /// # Returns
    ///
    /// The document ID (either newly created or existing)
    fn insert_document(&mut self, url: &str) -> StorageResult<i64>;

    /// Records word counts for a document in one transaction
    ///
    /// Unknown words are added to the vocabulary. A count already stored
    /// for the same document and word is replaced.
    fn insert_word_frequencies(
        &mut self,
        document_id: i64,
        frequencies: &HashMap<String, u32>,
    ) -> StorageResult<()>;

    // ===== Querying =====

    /// Finds the documents containing every one of `words`
    ///
    /// Relevance is the sum of the stored frequencies of the query words.
    /// At most 10 results, most relevant first, ties broken by URL.
    /// Duplicate query words count once; an empty query returns nothing.
    fn search(&self, words: &[String]) -> StorageResult<Vec<SearchResult>>;

    // ===== Statistics =====

    fn count_documents(&self) -> StorageResult<u64>;

    /// Number of distinct words in the vocabulary
    fn count_words(&self) -> StorageResult<u64>;

    /// Number of (document, word) frequency rows
    fn count_postings(&self) -> StorageResult<u64>;
}
