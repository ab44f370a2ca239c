//! Field extraction driven by the configured rule table
//!
//! This module contains:
//! - Compilation of rule specs into CSS selectors
//! - Review extraction from detail pages
//! - Review link discovery on listing pages

mod extractor;
mod rules;

pub use extractor::{extract, extract_review_links};
pub use rules::{ExtractionRule, LinkRule, RuleTable, Selection};
