//! Statistics generation from the index database
//!
//! This module provides functionality for extracting and displaying
//! index statistics from the storage layer.

use crate::storage::{Storage, StorageResult};

/// Index statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStatistics {
    /// Number of indexed documents
    pub documents: u64,

    /// Size of the vocabulary
    pub distinct_words: u64,

    /// Number of (document, word) frequency entries
    pub postings: u64,
}

impl IndexStatistics {
    /// Average number of distinct words per document
    pub fn words_per_document(&self) -> f64 {
        if self.documents == 0 {
            0.0
        } else {
            self.postings as f64 / self.documents as f64
        }
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(IndexStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<IndexStatistics> {
    Ok(IndexStatistics {
        documents: storage.count_documents()?,
        distinct_words: storage.count_words()?,
        postings: storage.count_postings()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &IndexStatistics) {
    println!("=== Index Statistics ===\n");
    println!("  Documents indexed: {}", stats.documents);
    println!("  Distinct words: {}", stats.distinct_words);
    println!("  Word postings: {}", stats.postings);
    println!(
        "  Distinct words per document: {:.1}",
        stats.words_per_document()
    );
}
