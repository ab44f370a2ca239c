//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::review::{Field, Review};
use crate::state::RunReport;
use crate::storage::RunRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Writes take `&mut self`; callers that share a backend across tasks go through
/// [`ReviewSink`](crate::storage::ReviewSink), which serializes them.
pub trait Storage {
    // ===== Schema =====

    /// Creates the tables if they do not exist; never drops or alters anything
    fn ensure_schema(&self) -> StorageResult<()>;

    // ===== Reviews =====

    /// Inserts one review as a new row
    fn append_review(&mut self, review: &Review) -> StorageResult<()>;

    /// Counts stored reviews
    fn count_reviews(&self) -> StorageResult<u64>;

    /// Counts stored reviews whose `field` fell back to the sentinel
    fn count_missing(&self, field: Field) -> StorageResult<u64>;

    // ===== Run Management =====

    /// Records the start of a run
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str, start_page: u32, end_page: u32)
        -> StorageResult<i64>;

    /// Stores the final counters and status of a run
    fn complete_run(&mut self, run_id: i64, report: &RunReport) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent runs, newest first
    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>>;
}
