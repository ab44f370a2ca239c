//! Per-page outcomes and the aggregated run report

use crate::state::PageJobState;
use crate::storage::RunStatus;

/// Result of one page job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    pub page: u32,

    /// Terminal state the job ended in
    pub state: PageJobState,

    /// Review links found on the listing page
    pub links_found: u64,

    /// Links dropped because an earlier page already produced them
    pub duplicates_skipped: u64,

    pub records_stored: u64,

    /// Detail fetches or writes that failed
    pub records_failed: u64,

    /// Listing failure description, for `PageFailed`
    pub error: Option<String>,
}

impl PageOutcome {
    pub fn new(page: u32, state: PageJobState) -> Self {
        Self {
            page,
            state,
            links_found: 0,
            duplicates_skipped: 0,
            records_stored: 0,
            records_failed: 0,
            error: None,
        }
    }

    pub fn failed(page: u32, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(page, PageJobState::PageFailed)
        }
    }
}

/// Counters for a whole harvest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Page jobs that were started
    pub pages_attempted: u64,
    pub pages_succeeded: u64,
    pub pages_failed: u64,

    /// Started page jobs that were interrupted
    pub pages_cancelled: u64,

    /// Page jobs never started because the run was interrupted
    pub pages_skipped: u64,

    pub links_found: u64,
    pub duplicates_skipped: u64,
    pub records_stored: u64,
    pub records_failed: u64,

    /// Listing pages that failed, in ascending order
    pub failed_pages: Vec<u32>,

    /// True if the run was interrupted
    pub cancelled: bool,
}

impl RunReport {
    /// Folds one page outcome into the counters
    pub fn record(&mut self, outcome: &PageOutcome) {
        self.pages_attempted += 1;
        match outcome.state {
            PageJobState::PageDone => self.pages_succeeded += 1,
            PageJobState::PageFailed => {
                self.pages_failed += 1;
                if let Err(pos) = self.failed_pages.binary_search(&outcome.page) {
                    self.failed_pages.insert(pos, outcome.page);
                }
            }
            _ => self.pages_cancelled += 1,
        }

        self.links_found += outcome.links_found;
        self.duplicates_skipped += outcome.duplicates_skipped;
        self.records_stored += outcome.records_stored;
        self.records_failed += outcome.records_failed;
    }

    /// Returns true if any page job failed
    pub fn has_failures(&self) -> bool {
        self.pages_failed > 0
    }

    /// Status persisted with the run record
    pub fn status(&self) -> RunStatus {
        if self.cancelled {
            RunStatus::Interrupted
        } else if self.has_failures() {
            RunStatus::Partial
        } else {
            RunStatus::Completed
        }
    }
}
