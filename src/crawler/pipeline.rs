//! Detail page processing: fetch one review page and extract its record

use crate::crawler::Fetcher;
use crate::extract::{extract, RuleTable};
use crate::review::Review;
use crate::FetchError;
use std::sync::Arc;
use url::Url;

/// Fetches a review page and extracts its record
pub struct ReviewPipeline {
    fetcher: Fetcher,
    rules: Arc<RuleTable>,
}

impl ReviewPipeline {
    pub fn new(fetcher: Fetcher, rules: Arc<RuleTable>) -> Self {
        Self { fetcher, rules }
    }

    /// Produces the review at `url`
    ///
    /// Only the fetch can fail; extraction always yields a complete record.
    pub async fn process(&self, url: &Url) -> Result<Review, FetchError> {
        let body = self.fetcher.fetch(url).await?;
        let review = extract(&body, &self.rules);
        tracing::trace!("Extracted '{}' by '{}' from {}", review.album, review.artist, url);
        Ok(review)
    }
}
