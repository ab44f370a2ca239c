//! Page and detail job scheduling
//!
//! The scheduler runs listing pages under an outer semaphore and, within each page,
//! detail fetches under an inner one. Every job reports its own result as a value:
//! a failed detail is counted against its page, a failed listing fails only that page,
//! and nothing a single job does can stop the run.

use crate::config::HarvestConfig;
use crate::crawler::{PageEnumerator, ReviewPipeline};
use crate::state::{PageJob, PageJobState, PageOutcome, RunReport};
use crate::storage::ReviewSink;
use crate::HarvestError;
use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Result of one detail job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailOutcome {
    /// The review was extracted and committed
    Stored,
    /// The detail page could not be fetched
    FetchFailed,
    /// The review was extracted but the write failed
    StoreFailed,
    /// The run was interrupted before the review was written
    Cancelled,
}

/// Drives every page job of a run
pub struct Scheduler {
    page_limit: Arc<Semaphore>,
    worker: PageWorker,
}

/// Everything a page job needs, shared across page tasks
#[derive(Clone)]
struct PageWorker {
    enumerator: Arc<PageEnumerator>,
    pipeline: Arc<ReviewPipeline>,
    sink: ReviewSink,
    detail_concurrency: usize,
    seen: Option<Arc<Mutex<HashSet<String>>>>,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new(
        enumerator: PageEnumerator,
        pipeline: ReviewPipeline,
        sink: ReviewSink,
        config: &HarvestConfig,
        cancel: CancellationToken,
    ) -> Self {
        let seen = config
            .dedupe_urls
            .then(|| Arc::new(Mutex::new(HashSet::new())));

        Self {
            page_limit: Arc::new(Semaphore::new(config.page_concurrency.max(1))),
            worker: PageWorker {
                enumerator: Arc::new(enumerator),
                pipeline: Arc::new(pipeline),
                sink,
                detail_concurrency: config.detail_concurrency.max(1),
                seen,
                cancel,
            },
        }
    }

    /// Runs one page job per page in `pages` and aggregates their outcomes
    ///
    /// Returns once every started job has finished. After cancellation no new page
    /// job is started; those pages are counted as skipped.
    pub async fn run(&self, pages: RangeInclusive<u32>) -> RunReport {
        let total = pages.clone().count() as u64;
        let mut report = RunReport::default();
        let mut jobs = JoinSet::new();
        let mut started = 0u64;

        for page in pages {
            let permit = tokio::select! {
                biased;
                _ = self.worker.cancel.cancelled() => break,
                permit = Arc::clone(&self.page_limit).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let worker = self.worker.clone();
            jobs.spawn(async move {
                let _permit = permit;
                worker.run(page).await
            });
            started += 1;
        }

        while let Some(joined) = jobs.join_next().await {
            match joined {
                Ok(outcome) => report.record(&outcome),
                Err(e) => {
                    tracing::error!("Page task aborted: {}", e);
                    report.pages_attempted += 1;
                    report.pages_failed += 1;
                }
            }
        }

        report.pages_skipped = total - started;
        report.cancelled = report.pages_skipped > 0 || report.pages_cancelled > 0;

        if report.cancelled {
            tracing::warn!(
                "Harvest interrupted: {} pages cancelled, {} never started",
                report.pages_cancelled,
                report.pages_skipped
            );
        }

        report
    }
}

impl PageWorker {
    async fn run(&self, page: u32) -> PageOutcome {
        let mut job = PageJob::new(page);
        match self.drive(&mut job).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Page {} aborted in state {}: {}", page, job.state(), e);
                PageOutcome::failed(page, e.to_string())
            }
        }
    }

    async fn drive(&self, job: &mut PageJob) -> Result<PageOutcome, HarvestError> {
        let page = job.page;
        job.advance(PageJobState::FetchingListing)?;

        let listing = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                job.advance(PageJobState::Cancelled)?;
                return Ok(PageOutcome::new(page, PageJobState::Cancelled));
            }
            listing = self.enumerator.enumerate(page) => listing,
        };

        let links = match listing {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!("Listing page {} failed: {}", page, e);
                job.advance(PageJobState::PageFailed)?;
                return Ok(PageOutcome::failed(page, e.to_string()));
            }
        };

        job.advance(PageJobState::Enumerated)?;
        let mut outcome = PageOutcome::new(page, PageJobState::Enumerated);
        outcome.links_found = links.len() as u64;

        let links = self.filter_seen(links);
        outcome.duplicates_skipped = outcome.links_found - links.len() as u64;

        let interrupted = self.run_details(links, &mut outcome).await;

        let state = if interrupted {
            PageJobState::Cancelled
        } else {
            PageJobState::PageDone
        };
        job.advance(state)?;
        outcome.state = state;

        tracing::info!(
            "Page {} {}: {} stored, {} failed",
            page,
            if interrupted { "interrupted" } else { "done" },
            outcome.records_stored,
            outcome.records_failed
        );

        Ok(outcome)
    }

    /// Drops links another page has already claimed, when deduplication is on
    ///
    /// The links that remain are claimed for this page.
    fn filter_seen(&self, links: Vec<Url>) -> Vec<Url> {
        let Some(seen) = &self.seen else {
            return links;
        };

        let mut seen = match seen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        links
            .into_iter()
            .filter(|url| seen.insert(url.as_str().to_string()))
            .collect()
    }

    /// Gives up this page's claim on a link whose review was not stored
    fn release_seen(&self, url: &str) {
        let Some(seen) = &self.seen else {
            return;
        };

        let mut seen = match seen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        seen.remove(url);
    }

    /// Runs the detail jobs of one page; returns true if any were cut short
    async fn run_details(&self, links: Vec<Url>, outcome: &mut PageOutcome) -> bool {
        let detail_limit = Arc::new(Semaphore::new(self.detail_concurrency));
        let mut details = JoinSet::new();
        let mut interrupted = false;

        for url in links {
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    interrupted = true;
                    break;
                }
                permit = Arc::clone(&detail_limit).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let pipeline = Arc::clone(&self.pipeline);
            let sink = self.sink.clone();
            let cancel = self.cancel.clone();
            details.spawn(async move {
                let _permit = permit;
                let key = url.as_str().to_string();
                (key, run_detail(&pipeline, &sink, &cancel, url).await)
            });
        }

        while let Some(joined) = details.join_next().await {
            match joined {
                Ok((_, DetailOutcome::Stored)) => outcome.records_stored += 1,
                Ok((url, DetailOutcome::FetchFailed | DetailOutcome::StoreFailed)) => {
                    outcome.records_failed += 1;
                    self.release_seen(&url);
                }
                Ok((url, DetailOutcome::Cancelled)) => {
                    interrupted = true;
                    self.release_seen(&url);
                }
                Err(e) => {
                    tracing::error!("Detail task on page {} aborted: {}", outcome.page, e);
                    outcome.records_failed += 1;
                }
            }
        }

        interrupted
    }
}

/// Fetches, extracts and stores one review
///
/// A write that has started is allowed to finish so the store only ever holds
/// complete rows.
async fn run_detail(
    pipeline: &ReviewPipeline,
    sink: &ReviewSink,
    cancel: &CancellationToken,
    url: Url,
) -> DetailOutcome {
    let review = tokio::select! {
        biased;
        _ = cancel.cancelled() => return DetailOutcome::Cancelled,
        review = pipeline.process(&url) => review,
    };

    let review = match review {
        Ok(review) => review,
        Err(e) => {
            tracing::warn!("Detail page failed: {}", e);
            return DetailOutcome::FetchFailed;
        }
    };

    let artist = review.artist.clone();
    let album = review.album.clone();
    match sink.append(review).await {
        Ok(()) => DetailOutcome::Stored,
        Err(e) => {
            tracing::error!(
                "Failed to store review '{}' by '{}' from {}: {}",
                album,
                artist,
                url,
                e
            );
            DetailOutcome::StoreFailed
        }
    }
}
