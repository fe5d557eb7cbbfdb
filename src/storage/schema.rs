//! Database schema definitions
//!
//! This module contains the SQL schema of the Sitespider index.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per indexed page
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE
);

-- Vocabulary
CREATE TABLE IF NOT EXISTS words (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    word TEXT NOT NULL UNIQUE
);

-- How often each word occurs in each document
CREATE TABLE IF NOT EXISTS word_freq (
    document_id INTEGER NOT NULL REFERENCES documents(id),
    word_id INTEGER NOT NULL REFERENCES words(id),
    frequency INTEGER NOT NULL,
    PRIMARY KEY (document_id, word_id)
);

CREATE INDEX IF NOT EXISTS idx_word_freq_word ON word_freq(word_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
