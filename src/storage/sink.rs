//! Shared write path for concurrent producers
//!
//! Detail jobs on many tasks hand their reviews to a single [`ReviewSink`]. The sink
//! owns the connection behind a mutex and runs each write on the blocking pool, so
//! physical writes happen one at a time and never stall the async workers.

use crate::review::Review;
use crate::state::RunReport;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::SqliteStorage;
use std::sync::{Arc, Mutex};

/// Cloneable handle to the single storage backend of a run
#[derive(Clone)]
pub struct ReviewSink {
    storage: Arc<Mutex<SqliteStorage>>,
}

impl ReviewSink {
    pub fn new(storage: SqliteStorage) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }

    /// Durably appends one review
    ///
    /// When this returns `Ok`, the row is committed.
    pub async fn append(&self, review: Review) -> StorageResult<()> {
        self.with_storage(move |storage| storage.append_review(&review))
            .await
    }

    /// Stores the final counters of a run
    pub async fn complete_run(&self, run_id: i64, report: RunReport) -> StorageResult<()> {
        self.with_storage(move |storage| storage.complete_run(run_id, &report))
            .await
    }

    pub async fn count_reviews(&self) -> StorageResult<u64> {
        self.with_storage(|storage| storage.count_reviews()).await
    }

    /// Runs `op` against the backend on the blocking pool, holding the write lock
    async fn with_storage<T, F>(&self, op: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteStorage) -> StorageResult<T> + Send + 'static,
    {
        let storage = Arc::clone(&self.storage);

        tokio::task::spawn_blocking(move || {
            let mut guard = storage
                .lock()
                .map_err(|_| StorageError::Database("storage lock poisoned".to_string()))?;
            op(&mut *guard)
        })
        .await
        .map_err(|e| StorageError::Database(format!("write task failed: {}", e)))?
    }
}
