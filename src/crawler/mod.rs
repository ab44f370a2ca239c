//! Harvest pipeline: fetching, enumeration, detail processing and scheduling
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with retry and backoff
//! - Listing page enumeration
//! - Detail page processing
//! - Two-level bounded scheduling with cooperative cancellation

mod enumerator;
mod fetcher;
mod pipeline;
mod scheduler;

pub use enumerator::PageEnumerator;
pub use fetcher::{build_http_client, Fetcher, RetryPolicy};
pub use pipeline::ReviewPipeline;
pub use scheduler::{DetailOutcome, Scheduler};

use crate::config::Config;
use crate::extract::RuleTable;
use crate::state::RunReport;
use crate::storage::{open_storage, ReviewSink, Storage};
use crate::HarvestError;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs a complete harvest
///
/// This is the main entry point for a run. It will:
/// 1. Compile the rule table and build the shared HTTP client
/// 2. Open the database and record the start of the run
/// 3. Schedule every listing page and its detail pages
/// 4. Record the final counters of the run
///
/// Only setup can fail. Once pages are being fetched, failures are counted in the
/// returned report instead.
pub async fn harvest(
    config: Config,
    config_hash: &str,
    cancel: CancellationToken,
) -> Result<RunReport, HarvestError> {
    let rules = Arc::new(RuleTable::compile(&config.rules)?);
    let origin = crate::url::parse_origin(&config.site.origin)?;
    let fetcher = Fetcher::new(&config.fetch)?;

    let mut storage = open_storage(Path::new(&config.output.database_path))?;
    let pages = config.harvest.pages();
    let run_id = storage.create_run(config_hash, *pages.start(), *pages.end())?;
    let sink = ReviewSink::new(storage);

    tracing::info!(
        "Starting run {}: pages {}..={} of {} ({} pages at a time, {} details per page)",
        run_id,
        pages.start(),
        pages.end(),
        origin,
        config.harvest.page_concurrency,
        config.harvest.detail_concurrency
    );

    let enumerator = PageEnumerator::new(
        fetcher.clone(),
        origin,
        config.site.listing_path.clone(),
        Arc::clone(&rules),
    );
    let pipeline = ReviewPipeline::new(fetcher, rules);
    let scheduler = Scheduler::new(enumerator, pipeline, sink.clone(), &config.harvest, cancel);

    let report = scheduler.run(pages).await;

    if let Err(e) = sink.complete_run(run_id, report.clone()).await {
        tracing::error!("Failed to record the end of run {}: {}", run_id, e);
    }

    tracing::info!(
        "Run {} finished ({}): {} records stored, {} failed",
        run_id,
        report.status().to_db_string(),
        report.records_stored,
        report.records_failed
    );

    Ok(report)
}
