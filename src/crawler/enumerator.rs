//! Listing page enumeration
//!
//! Turns a page number into the list of review URLs linked from that listing page.

use crate::crawler::Fetcher;
use crate::extract::{extract_review_links, RuleTable};
use crate::url::listing_url;
use crate::FetchError;
use std::sync::Arc;
use url::Url;

/// Fetches listing pages and collects their review links
pub struct PageEnumerator {
    fetcher: Fetcher,
    origin: Url,
    listing_path: String,
    rules: Arc<RuleTable>,
}

impl PageEnumerator {
    pub fn new(fetcher: Fetcher, origin: Url, listing_path: String, rules: Arc<RuleTable>) -> Self {
        Self {
            fetcher,
            origin,
            listing_path,
            rules,
        }
    }

    /// URL of listing page `page`
    pub fn listing_url(&self, page: u32) -> Result<Url, FetchError> {
        listing_url(&self.origin, &self.listing_path, page).map_err(|e| FetchError::InvalidUrl {
            url: format!(
                "{}{}",
                self.origin.as_str().trim_end_matches('/'),
                self.listing_path.replace("{page}", &page.to_string())
            ),
            message: e.to_string(),
        })
    }

    /// Fetches listing page `page` and returns the review URLs on it
    ///
    /// A page with no matching links yields an empty list; that is how pages past
    /// the end of the listing look.
    pub async fn enumerate(&self, page: u32) -> Result<Vec<Url>, FetchError> {
        let url = self.listing_url(page)?;
        let body = self.fetcher.fetch(&url).await?;

        let links = extract_review_links(&body, &self.rules.listing, &self.origin);
        if links.is_empty() {
            tracing::info!("Listing page {} has no review links", page);
        } else {
            tracing::debug!("Listing page {}: {} review links", page, links.len());
        }

        Ok(links)
    }
}
