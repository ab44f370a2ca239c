//! Database schema definitions
//!
//! The `reviews` table is a fixed external contract: every column is TEXT, there is no
//! key and no uniqueness constraint. Both tables are created only if absent and are
//! never altered or dropped.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Harvested reviews, column order is part of the contract
CREATE TABLE IF NOT EXISTS reviews (
    artist TEXT,
    album TEXT,
    score TEXT,
    year TEXT,
    reviewer TEXT,
    genre TEXT,
    label TEXT,
    review_date TEXT,
    summary TEXT,
    review TEXT,
    best_new TEXT
);

-- Track harvest runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    start_page INTEGER NOT NULL,
    end_page INTEGER NOT NULL,
    pages_succeeded INTEGER NOT NULL DEFAULT 0,
    pages_failed INTEGER NOT NULL DEFAULT 0,
    records_stored INTEGER NOT NULL DEFAULT 0,
    records_failed INTEGER NOT NULL DEFAULT 0
);
"#;

/// Insert statement for one review, values in column order
pub const INSERT_REVIEW_SQL: &str = "INSERT INTO reviews (artist, album, score, year, reviewer, genre, label, review_date, summary, review, best_new)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
