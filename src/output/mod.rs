//! Output module for run reports and database statistics
//!
//! This module handles:
//! - Printing the report of a finished run
//! - Summarizing what the review database holds

pub mod stats;

pub use stats::{load_statistics, print_statistics, HarvestStatistics};

use crate::state::RunReport;

/// Prints the report of a finished run to stdout
pub fn print_report(report: &RunReport) {
    println!("=== Harvest Report ===\n");

    println!("Status: {}", report.status().to_db_string());
    println!();

    println!("Pages:");
    println!("  Attempted: {}", report.pages_attempted);
    println!("  Succeeded: {}", report.pages_succeeded);
    println!("  Failed: {}", report.pages_failed);
    if report.pages_cancelled > 0 || report.pages_skipped > 0 {
        println!("  Cancelled: {}", report.pages_cancelled);
        println!("  Not started: {}", report.pages_skipped);
    }
    println!();

    println!("Reviews:");
    println!("  Links found: {}", report.links_found);
    if report.duplicates_skipped > 0 {
        println!("  Duplicates skipped: {}", report.duplicates_skipped);
    }
    println!("  Stored: {}", report.records_stored);
    println!("  Failed: {}", report.records_failed);

    if !report.failed_pages.is_empty() {
        println!();
        println!("Failed listing pages:");
        for page in &report.failed_pages {
            println!("  - {}", page);
        }
    }
}
