//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageResult};
use crate::storage::{SearchResult, MAX_SEARCH_RESULTS};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        let mut storage = Self { conn };
        storage.ensure_schema()?;
        Ok(storage)
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let mut storage = Self { conn };
        storage.ensure_schema()?;
        Ok(storage)
    }

    fn count_rows(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl Storage for SqliteStorage {
    fn ensure_schema(&mut self) -> StorageResult<()> {
        initialize_schema(&self.conn)?;
        Ok(())
    }

    // ===== Indexing =====

    fn insert_document(&mut self, url: &str) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO documents (url) VALUES (?1) ON CONFLICT(url) DO NOTHING",
            params![url],
        )?;

        let id = self.conn.query_row(
            "SELECT id FROM documents WHERE url = ?1",
            params![url],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    fn insert_word_frequencies(
        &mut self,
        document_id: i64,
        frequencies: &HashMap<String, u32>,
    ) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        {
            let mut insert_word = tx.prepare_cached(
                "INSERT INTO words (word) VALUES (?1) ON CONFLICT(word) DO NOTHING",
            )?;
            let mut select_word = tx.prepare_cached("SELECT id FROM words WHERE word = ?1")?;
            let mut upsert_freq = tx.prepare_cached(
                "INSERT INTO word_freq (document_id, word_id, frequency) VALUES (?1, ?2, ?3)
                 ON CONFLICT(document_id, word_id) DO UPDATE SET frequency = excluded.frequency",
            )?;

            for (word, count) in frequencies {
                insert_word.execute(params![word])?;
                let word_id: i64 = select_word.query_row(params![word], |row| row.get(0))?;
                upsert_freq.execute(params![document_id, word_id, count])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    // ===== Querying =====

    fn search(&self, words: &[String]) -> StorageResult<Vec<SearchResult>> {
        let distinct: BTreeSet<&str> = words.iter().map(String::as_str).collect();
        if distinct.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; distinct.len()].join(", ");
        let sql = format!(
            "SELECT d.url, SUM(wf.frequency) AS relevance
             FROM documents d
             JOIN word_freq wf ON d.id = wf.document_id
             JOIN words w ON wf.word_id = w.id
             WHERE w.word IN ({})
             GROUP BY d.id
             HAVING COUNT(DISTINCT w.word) = ?
             ORDER BY relevance DESC, d.url ASC
             LIMIT ?",
            placeholders
        );

        let mut values: Vec<Value> = distinct
            .iter()
            .map(|word| Value::Text(word.to_string()))
            .collect();
        values.push(Value::Integer(distinct.len() as i64));
        values.push(Value::Integer(MAX_SEARCH_RESULTS as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let results = stmt
            .query_map(params_from_iter(values), |row| {
                Ok(SearchResult {
                    url: row.get(0)?,
                    relevance: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(results)
    }

    // ===== Statistics =====

    fn count_documents(&self) -> StorageResult<u64> {
        self.count_rows("SELECT COUNT(*) FROM documents")
    }

    fn count_words(&self) -> StorageResult<u64> {
        self.count_rows("SELECT COUNT(*) FROM words")
    }

    fn count_postings(&self) -> StorageResult<u64> {
        self.count_rows("SELECT COUNT(*) FROM word_freq")
    }
}
