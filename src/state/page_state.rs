/// Page job state definitions
///
/// A page job walks `Pending -> FetchingListing -> Enumerated -> PageDone`. It ends in
/// `PageFailed` only when the listing itself cannot be fetched, and in `Cancelled` when
/// the run is interrupted before it finishes.
use crate::HarvestError;
use std::fmt;

/// Represents the current state of a page job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageJobState {
    // ===== Active States =====
    /// Job is waiting for a page slot
    Pending,

    /// Listing page is being fetched
    FetchingListing,

    /// Review links are known and detail jobs are running
    Enumerated,

    // ===== Terminal States =====
    /// Every detail job has finished, successfully or not
    PageDone,

    /// The listing page could not be fetched
    PageFailed,

    /// The run was interrupted before the job finished
    Cancelled,
}

impl PageJobState {
    /// Returns true if moving to `next` is a legal step
    pub fn can_transition_to(&self, next: PageJobState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::FetchingListing)
                | (Self::Pending, Self::Cancelled)
                | (Self::FetchingListing, Self::Enumerated)
                | (Self::FetchingListing, Self::PageFailed)
                | (Self::FetchingListing, Self::Cancelled)
                | (Self::Enumerated, Self::PageDone)
                | (Self::Enumerated, Self::Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::FetchingListing => "fetching_listing",
            Self::Enumerated => "enumerated",
            Self::PageDone => "page_done",
            Self::PageFailed => "page_failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PageJobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single listing page moving through its states
#[derive(Debug, Clone, Copy)]
pub struct PageJob {
    pub page: u32,
    state: PageJobState,
}

impl PageJob {
    pub fn new(page: u32) -> Self {
        Self {
            page,
            state: PageJobState::Pending,
        }
    }

    pub fn state(&self) -> PageJobState {
        self.state
    }

    /// Moves the job to `next`, rejecting illegal transitions
    pub fn advance(&mut self, next: PageJobState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::trace!("Page {}: {} -> {}", self.page, self.state, next);
        self.state = next;
        Ok(())
    }
}
