//! Configuration module for the harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! including the extraction rule table.
//!
//! # Example
//!
//! ```no_run
//! use review_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Harvesting pages {:?}", config.harvest.pages());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FetchConfig, HarvestConfig, LinkRuleSpec, OutputConfig, RuleSpec, RulesConfig,
    SelectMode, SiteConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
