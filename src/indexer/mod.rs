//! Text pipeline for the search index
//!
//! This module turns fetched HTML into word counts:
//! - `clean_html` extracts the visible text of a page
//! - `analyze_text` lowercases, tokenizes and counts words
//! - `index_page` stores the counts of one page
//! - `indexing_callback` adapts all of the above into a crawler page callback

use crate::crawler::PageCallback;
use crate::storage::{SharedStorage, Storage, StorageResult};
use scraper::{Html, Node};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError};

/// Elements whose text is never indexed
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript"];

/// Shortest word kept by [`analyze_text`], in characters
pub const MIN_WORD_CHARS: usize = 3;

/// Longest word kept by [`analyze_text`], in characters
pub const MAX_WORD_CHARS: usize = 32;

/// Extracts the text of an HTML document as space-separated words
///
/// Markup is dropped, entities are decoded by the parser, text inside
/// `script`, `style` and `noscript` is skipped, and every character that
/// is not alphanumeric becomes a space.
///
/// # Example
///
/// ```
/// use sitespider::indexer::clean_html;
///
/// let text = clean_html("<p>Fish&amp;Chips</p><script>var x;</script>");
/// assert_eq!(text.split_whitespace().collect::<Vec<_>>(), vec!["Fish", "Chips"]);
/// ```
pub fn clean_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::with_capacity(html.len() / 2);

    for node in document.tree.nodes() {
        let Node::Text(fragment) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
            Node::Element(element) => SKIPPED_ELEMENTS.contains(&element.name()),
            _ => false,
        });
        if hidden {
            continue;
        }

        text.push_str(fragment);
        text.push(' ');
    }

    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect()
}

/// Counts word occurrences in cleaned text
///
/// Words are lowercased and split on whitespace; words shorter than
/// [`MIN_WORD_CHARS`] or longer than [`MAX_WORD_CHARS`] are dropped.
pub fn analyze_text(text: &str) -> HashMap<String, u32> {
    let mut frequencies = HashMap::new();

    for word in text.to_lowercase().split_whitespace() {
        let length = word.chars().count();
        if !(MIN_WORD_CHARS..=MAX_WORD_CHARS).contains(&length) {
            continue;
        }
        *frequencies.entry(word.to_string()).or_insert(0) += 1;
    }

    frequencies
}

/// Cleans, analyzes and stores one page
///
/// # Returns
///
/// The number of distinct words recorded for the page
pub fn index_page(storage: &mut dyn Storage, url: &str, html: &str) -> StorageResult<usize> {
    let frequencies = analyze_text(&clean_html(html));
    let document_id = storage.insert_document(url)?;
    storage.insert_word_frequencies(document_id, &frequencies)?;
    Ok(frequencies.len())
}

/// Builds a page callback that indexes every fetched page into `storage`
///
/// Storage errors are logged and the page is skipped; the crawl goes on.
pub fn indexing_callback(storage: SharedStorage) -> PageCallback {
    Arc::new(move |url: &str, html: &str, depth: u32| {
        let mut guard = storage.lock().unwrap_or_else(PoisonError::into_inner);
        match index_page(&mut *guard, url, html) {
            Ok(words) => {
                tracing::debug!("Indexed {} words from {} (depth {})", words, url, depth)
            }
            Err(e) => tracing::warn!("Failed to index {}: {}", url, e),
        }
    })
}
