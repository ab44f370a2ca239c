use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is recorded with every run so stored reviews can be traced back to the
/// rule table that produced them.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectMode;
    use crate::review::Field;
    use crate::test_utils::config_text;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(&config_text("https://example.com"));
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.site.origin, "https://example.com");
        assert_eq!(config.site.listing_path, "/reviews/albums/?page={page}");
        assert_eq!(config.harvest.pages(), 1..=3);
        assert_eq!(config.harvest.page_concurrency, 4);
        assert!(!config.harvest.dedupe_urls);
        assert_eq!(config.fetch.max_attempts, 3);
        assert_eq!(config.rules.fields.len(), 11);
        assert_eq!(config.rules.listing.attribute, "href");

        let genre = &config.rules.fields[&Field::Genre];
        assert_eq!(genre.select, SelectMode::Nth);
        assert_eq!(genre.min_count, Some(3));
    }

    #[test]
    fn test_fetch_section_is_optional() {
        let text = config_text("https://example.com");
        let start = text.find("[fetch]").unwrap();
        let end = text.find("[output]").unwrap();
        let without_fetch = format!("{}{}", &text[..start], &text[end..]);

        let config = parse_config(&without_fetch).unwrap();
        assert_eq!(config.fetch.timeout_ms, 30_000);
        assert_eq!(config.fetch.max_attempts, 3);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/harvester.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_field_name_is_rejected() {
        let text = format!(
            "{}\n[rules.fields.producer]\ntag = \"div\"\n",
            config_text("https://example.com")
        );
        assert!(matches!(parse_config(&text), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let text = config_text("https://example.com").replace("page-concurrency = 4", "page-concurrency = 0");
        let result = parse_config(&text);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
