use crate::config::types::{Config, FetchConfig, HarvestConfig, OutputConfig, SiteConfig};
use crate::extract::RuleTable;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// The rule table is compiled as part of validation so that a broken selector is
/// reported at startup, before any page is requested.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_harvest_config(&config.harvest)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    RuleTable::compile(&config.rules)?;
    Ok(())
}

/// Validates the target site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let origin = Url::parse(&config.origin)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid origin '{}': {}", config.origin, e)))?;

    if origin.scheme() != "http" && origin.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "origin must use http or https, got '{}'",
            origin.scheme()
        )));
    }

    if origin.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "origin '{}' has no host",
            config.origin
        )));
    }

    if !config.listing_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "listing_path must start with '/', got '{}'",
            config.listing_path
        )));
    }

    if !config.listing_path.contains("{page}") {
        return Err(ConfigError::Validation(format!(
            "listing_path must contain a {{page}} placeholder, got '{}'",
            config.listing_path
        )));
    }

    Ok(())
}

/// Validates page range and concurrency bounds
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.start_page < 1 {
        return Err(ConfigError::Validation(
            "start_page must be >= 1".to_string(),
        ));
    }

    if config.end_page < config.start_page {
        return Err(ConfigError::Validation(format!(
            "end_page ({}) must be >= start_page ({})",
            config.end_page, config.start_page
        )));
    }

    if config.page_concurrency < 1 || config.page_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "page_concurrency must be between 1 and 100, got {}",
            config.page_concurrency
        )));
    }

    if config.detail_concurrency < 1 || config.detail_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "detail_concurrency must be between 1 and 100, got {}",
            config.detail_concurrency
        )));
    }

    Ok(())
}

/// Validates HTTP client and retry settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "timeout_ms must be >= 100ms, got {}ms",
            config.timeout_ms
        )));
    }

    if config.connect_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_ms must be > 0".to_string(),
        ));
    }

    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.backoff_max_ms < config.backoff_base_ms {
        return Err(ConfigError::Validation(format!(
            "backoff_max_ms ({}) must be >= backoff_base_ms ({})",
            config.backoff_max_ms, config.backoff_base_ms
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
