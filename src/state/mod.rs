//! Job state tracking for the harvester
//!
//! This module tracks page job state transitions and aggregates job outcomes into
//! the run report.

mod page_state;
mod run_report;

pub use page_state::{PageJob, PageJobState};
pub use run_report::{PageOutcome, RunReport};
