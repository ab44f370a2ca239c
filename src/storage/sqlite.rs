//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::review::{Field, Review, NOT_AVAILABLE};
use crate::state::RunReport;
use crate::storage::schema::{initialize_schema, INSERT_REVIEW_SQL};
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use crate::HarvestError;
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, start_page, end_page,
     pages_succeeded, pages_failed, records_stored, records_failed";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path` and ensures the schema exists
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        let storage = Self { conn };
        storage.ensure_schema()?;
        Ok(storage)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.ensure_schema()?;
        Ok(storage)
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
        start_page: row.get(5)?,
        end_page: row.get(6)?,
        pages_succeeded: row.get::<_, i64>(7)? as u64,
        pages_failed: row.get::<_, i64>(8)? as u64,
        records_stored: row.get::<_, i64>(9)? as u64,
        records_failed: row.get::<_, i64>(10)? as u64,
    })
}

impl Storage for SqliteStorage {
    // ===== Schema =====

    fn ensure_schema(&self) -> StorageResult<()> {
        initialize_schema(&self.conn)?;
        Ok(())
    }

    // ===== Reviews =====

    fn append_review(&mut self, review: &Review) -> StorageResult<()> {
        let [artist, album, score, year, reviewer, genre, label, review_date, summary, text, best_new] =
            review.values();

        // Autocommit: the row is durable once execute returns
        self.conn.execute(
            INSERT_REVIEW_SQL,
            params![
                artist,
                album,
                score,
                year,
                reviewer,
                genre,
                label,
                review_date,
                summary,
                text,
                best_new
            ],
        )?;
        Ok(())
    }

    fn count_reviews(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM reviews", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_missing(&self, field: Field) -> StorageResult<u64> {
        // Column names come from a closed enum, never from input
        let sql = format!(
            "SELECT COUNT(*) FROM reviews WHERE {} = ?1",
            field.column()
        );
        let count: i64 = self
            .conn
            .query_row(&sql, params![NOT_AVAILABLE], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Run Management =====

    fn create_run(
        &mut self,
        config_hash: &str,
        start_page: u32,
        end_page: u32,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status, start_page, end_page)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                now,
                config_hash,
                RunStatus::Running.to_db_string(),
                start_page,
                end_page
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(&mut self, run_id: i64, report: &RunReport) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_succeeded = ?3,
             pages_failed = ?4, records_stored = ?5, records_failed = ?6 WHERE id = ?7",
            params![
                report.status().to_db_string(),
                now,
                report.pages_succeeded as i64,
                report.pages_failed as i64,
                report.records_stored as i64,
                report.records_failed as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .map_err(|_| StorageError::RunNotFound(run_id))
    }

    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT ?1", RUN_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;

        let runs = stmt
            .query_map(params![limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(runs)
    }
}
