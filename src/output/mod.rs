//! Output module for reporting on the index
//!
//! This module handles:
//! - Recording index statistics
//! - Printing search results for the command line

pub mod stats;

pub use stats::{load_statistics, print_statistics, IndexStatistics};

use crate::storage::SearchResult;

/// Prints ranked search results to stdout
pub fn print_search_results(words: &[String], results: &[SearchResult]) {
    println!("Results for: {}\n", words.join(" "));

    if results.is_empty() {
        println!("  Nothing found.");
        return;
    }

    for (rank, result) in results.iter().enumerate() {
        println!("  {:>2}. {} ({})", rank + 1, result.url, result.relevance);
    }
}
