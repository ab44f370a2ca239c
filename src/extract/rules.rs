//! Compiled extraction rules
//!
//! The rule table is configuration data. At startup each rule spec is turned into a
//! CSS selector; a rule that cannot be compiled is a configuration error.

use crate::config::{LinkRuleSpec, RuleSpec, RulesConfig, SelectMode};
use crate::review::Field;
use crate::ConfigError;
use scraper::Selector;
use std::collections::BTreeMap;

/// How a compiled rule turns its matches into a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// First match in document order
    First,
    /// The match at `index`, provided at least `min_count` elements matched
    Nth { index: usize, min_count: usize },
    /// Every child of every match, joined with single spaces
    Concat,
}

/// Locates one review field within a detail page
#[derive(Debug, Clone)]
pub struct ExtractionRule {
    pub field: Field,
    pub selector: Selector,
    pub child: Option<Selector>,
    pub selection: Selection,
}

/// Locates review links within a listing page
#[derive(Debug, Clone)]
pub struct LinkRule {
    pub selector: Selector,
    pub attribute: String,
}

/// The full set of compiled rules, one per field in column order
#[derive(Debug, Clone)]
pub struct RuleTable {
    pub listing: LinkRule,
    rules: Vec<ExtractionRule>,
}

impl RuleTable {
    /// Compiles the configured rule table
    ///
    /// Every field must have a rule. A rule whose predicate does not form a valid
    /// selector, or whose selection options contradict each other, is rejected.
    pub fn compile(config: &RulesConfig) -> Result<Self, ConfigError> {
        let listing = compile_link_rule(&config.listing)?;

        let mut rules = Vec::with_capacity(Field::ALL.len());
        for field in Field::ALL {
            let spec = config
                .fields
                .get(&field)
                .ok_or_else(|| ConfigError::InvalidRule {
                    field: field.name().to_string(),
                    message: "no rule configured".to_string(),
                })?;
            rules.push(compile_rule(field, spec)?);
        }

        Ok(Self { listing, rules })
    }

    /// Rules in column order
    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    /// The rule for a single field
    pub fn rule(&self, field: Field) -> Option<&ExtractionRule> {
        self.rules.iter().find(|rule| rule.field == field)
    }
}

fn compile_link_rule(spec: &LinkRuleSpec) -> Result<LinkRule, ConfigError> {
    let selector = build_selector("listing", &spec.tag, spec.class.as_deref(), &spec.attributes)?;

    if spec.attribute.trim().is_empty() {
        return Err(invalid("listing", "link attribute cannot be empty"));
    }

    Ok(LinkRule {
        selector,
        attribute: spec.attribute.trim().to_string(),
    })
}

fn compile_rule(field: Field, spec: &RuleSpec) -> Result<ExtractionRule, ConfigError> {
    let name = field.name();
    let selector = build_selector(name, &spec.tag, spec.class.as_deref(), &spec.attributes)?;

    let child = match spec.child.as_deref() {
        Some(child) => Some(parse_selector(name, child.trim())?),
        None => None,
    };

    let selection = match spec.select {
        SelectMode::Nth => {
            let index = spec
                .index
                .ok_or_else(|| invalid(name, "select = \"nth\" requires an index"))?;
            Selection::Nth {
                index,
                min_count: spec.min_count.unwrap_or(0),
            }
        }
        mode => {
            if spec.index.is_some() || spec.min_count.is_some() {
                return Err(invalid(
                    name,
                    "index and min-count are only valid with select = \"nth\"",
                ));
            }
            if mode == SelectMode::Concat {
                Selection::Concat
            } else {
                Selection::First
            }
        }
    };

    Ok(ExtractionRule {
        field,
        selector,
        child,
        selection,
    })
}

/// Builds `tag.class1.class2[attr="value"]` from a predicate
fn build_selector(
    field: &str,
    tag: &str,
    class: Option<&str>,
    attributes: &BTreeMap<String, String>,
) -> Result<Selector, ConfigError> {
    let tag = tag.trim();
    if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(invalid(field, &format!("invalid tag name '{}'", tag)));
    }

    let mut css = tag.to_string();
    for class in class.unwrap_or_default().split_whitespace() {
        css.push('.');
        css.push_str(class);
    }
    for (name, value) in attributes {
        css.push_str(&format!(
            "[{}=\"{}\"]",
            name,
            value.replace('\\', "\\\\").replace('"', "\\\"")
        ));
    }

    parse_selector(field, &css)
}

fn parse_selector(field: &str, css: &str) -> Result<Selector, ConfigError> {
    Selector::parse(css).map_err(|e| invalid(field, &format!("bad selector '{}': {:?}", css, e)))
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidRule {
        field: field.to_string(),
        message: message.to_string(),
    }
}
