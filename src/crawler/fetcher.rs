//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building the shared HTTP client with timeouts and user agent
//! - GET requests for listing and detail pages
//! - Retry with exponential backoff for transient failures
//! - Error classification

use crate::config::FetchConfig;
use crate::FetchError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds the HTTP client shared by every fetch of a run
///
/// # Example
///
/// ```no_run
/// use review_harvester::config::FetchConfig;
/// use review_harvester::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.backoff_base_ms),
            max_delay: Duration::from_millis(config.backoff_max_ms),
        }
    }

    /// Delay after the given failed attempt (1-based): `base * 2^(attempt - 1)`, capped
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Fetches page bodies over a shared connection pool
///
/// Cloning is cheap; clones share the same pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    /// Builds a fetcher from the fetch configuration
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(
            build_http_client(config)?,
            RetryPolicy::from_config(config),
        ))
    }

    pub fn with_client(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Fetches a URL and returns its body
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Return body |
    /// | HTTP 429, 5xx | Retry with backoff |
    /// | Timeout, connection failure | Retry with backoff |
    /// | Other HTTP 4xx | Fail immediately |
    ///
    /// After `max_attempts` the last error is returned.
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let mut attempt = 1;

        loop {
            match self.fetch_once(url).await {
                Ok(body) => {
                    if attempt > 1 {
                        tracing::debug!("Fetched {} on attempt {}", url, attempt);
                    }
                    return Ok(body);
                }
                Err(e) if e.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_after(attempt);
                    tracing::debug!(
                        "Attempt {}/{} for {} failed: {}; retrying in {:?}",
                        attempt,
                        self.policy.max_attempts,
                        url,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// A single GET without retry
    async fn fetch_once(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify_error(url, e))
    }
}

/// Maps a reqwest error onto the fetch error taxonomy
fn classify_error(url: &Url, e: reqwest::Error) -> FetchError {
    let url = url.to_string();

    if e.is_timeout() {
        FetchError::Timeout { url }
    } else if e.is_connect() {
        FetchError::Connect {
            url,
            message: e.to_string(),
        }
    } else if e.is_builder() {
        FetchError::InvalidUrl {
            url,
            message: e.to_string(),
        }
    } else if let Some(status) = e.status() {
        FetchError::Status {
            url,
            status: status.as_u16(),
        }
    } else {
        FetchError::Transport {
            url,
            message: e.to_string(),
        }
    }
}
