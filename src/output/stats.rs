//! Statistics generation from the review database
//!
//! This module provides functionality for extracting and displaying
//! what previous runs have stored.

use crate::review::Field;
use crate::storage::{RunRecord, Storage};
use crate::HarvestError;

/// How many past runs `--stats` lists
pub const RECENT_RUNS: usize = 5;

/// Review database summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Total number of stored reviews
    pub total_reviews: u64,

    /// Per field, the number of reviews holding the sentinel, in column order
    pub missing: Vec<(Field, u64)>,

    /// Most recent runs, newest first
    pub recent_runs: Vec<RunRecord>,
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> Result<HarvestStatistics, HarvestError> {
    let total_reviews = storage.count_reviews()?;

    let mut missing = Vec::with_capacity(Field::ALL.len());
    for field in Field::ALL {
        missing.push((field, storage.count_missing(field)?));
    }

    let recent_runs = storage.recent_runs(RECENT_RUNS)?;

    Ok(HarvestStatistics {
        total_reviews,
        missing,
        recent_runs,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Review Statistics ===\n");

    println!("Stored reviews: {}", stats.total_reviews);
    println!();

    println!("Fields not available:");
    for (field, count) in &stats.missing {
        let percentage = if stats.total_reviews > 0 {
            (*count as f64 / stats.total_reviews as f64) * 100.0
        } else {
            0.0
        };
        println!("  {:<12} {} ({:.1}%)", field.name(), count, percentage);
    }
    println!();

    if stats.recent_runs.is_empty() {
        println!("No runs recorded.");
        return;
    }

    println!("Recent runs:");
    for run in &stats.recent_runs {
        println!(
            "  #{} {} pages {}..={} [{}]: {} stored, {} failed, {} failed pages",
            run.id,
            run.started_at,
            run.start_page,
            run.end_page,
            run.status.to_db_string(),
            run.records_stored,
            run.records_failed,
            run.pages_failed
        );
    }
}
