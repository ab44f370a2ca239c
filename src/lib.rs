//! Review Harvester: a bounded, fault-isolated album review scraper
//!
//! This crate walks a paginated review listing, follows every review link it finds,
//! extracts a fixed set of fields through a configurable rule table, and appends each
//! record to a SQLite database.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod review;
pub mod state;
pub mod storage;
pub mod url;

#[cfg(test)]
mod test_utils;

use thiserror::Error;

/// Main error type for harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid page job transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PageJobState,
        to: state::PageJobState,
    },
}

/// Configuration-specific errors
///
/// These are the only errors that stop a harvest, and they are raised before any
/// request is sent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid extraction rule for '{field}': {message}")]
    InvalidRule { field: String, message: String },
}

/// Errors raised while fetching a single URL
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Cannot request {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

impl FetchError {
    /// The URL the failed request was addressed to
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url }
            | Self::Status { url, .. }
            | Self::Connect { url, .. }
            | Self::Transport { url, .. }
            | Self::InvalidUrl { url, .. } => url,
        }
    }

    /// Returns true if the failure is transient and the request may be retried
    ///
    /// Timeouts, connection failures, 5xx and 429 are transient. Every other
    /// 4xx and malformed URLs are terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connect { .. } | Self::Transport { .. } => true,
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            Self::InvalidUrl { .. } => false,
        }
    }
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Malformed listing template: {0}")]
    Template(String),
}

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use review::{Field, Review, NOT_AVAILABLE};
pub use state::{PageJobState, RunReport};

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> FetchError {
        FetchError::Status {
            url: "https://example.com/".to_string(),
            status,
        }
    }

    #[test]
    fn test_server_errors_are_retryable() {
        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
    }

    #[test]
    fn test_client_errors_are_terminal() {
        assert!(!status(404).is_retryable());
        assert!(!status(403).is_retryable());
        assert!(!status(400).is_retryable());
    }

    #[test]
    fn test_transport_failures_are_retryable() {
        let timeout = FetchError::Timeout {
            url: "https://example.com/".to_string(),
        };
        assert!(timeout.is_retryable());
        assert_eq!(timeout.url(), "https://example.com/");

        let invalid = FetchError::InvalidUrl {
            url: "nope".to_string(),
            message: "relative URL without a base".to_string(),
        };
        assert!(!invalid.is_retryable());
    }
}
