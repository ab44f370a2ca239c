//! HTML extraction for listing and detail pages
//!
//! Extraction never fails. A rule that matches nothing, matches too few elements, or
//! yields only whitespace resolves to [`NOT_AVAILABLE`] for its own field and leaves
//! every other field untouched.

use crate::extract::rules::{ExtractionRule, LinkRule, RuleTable, Selection};
use crate::review::{Review, NOT_AVAILABLE};
use crate::url::resolve_href;
use scraper::{ElementRef, Html};
use url::Url;

/// Extracts one review from a detail page body
///
/// # Example
///
/// ```no_run
/// use review_harvester::config::load_config;
/// use review_harvester::extract::{extract, RuleTable};
/// use std::path::Path;
///
/// let config = load_config(Path::new("harvester.toml")).unwrap();
/// let rules = RuleTable::compile(&config.rules).unwrap();
/// let review = extract("<html><body></body></html>", &rules);
/// assert_eq!(review.artist, "Not Available");
/// ```
pub fn extract(body: &str, rules: &RuleTable) -> Review {
    let document = Html::parse_document(body);

    Review::from_fn(|field| {
        rules
            .rule(field)
            .and_then(|rule| apply_rule(&document, rule))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    })
}

/// Collects the review links on a listing page, resolved against `origin`
///
/// Anchors without the link attribute, or whose target cannot be resolved to an
/// http(s) URL, are skipped.
pub fn extract_review_links(body: &str, rule: &LinkRule, origin: &Url) -> Vec<Url> {
    let document = Html::parse_document(body);

    document
        .select(&rule.selector)
        .filter_map(|element| element.value().attr(&rule.attribute))
        .filter_map(|href| resolve_href(origin, href))
        .collect()
}

fn apply_rule(document: &Html, rule: &ExtractionRule) -> Option<String> {
    match rule.selection {
        Selection::First => {
            let node = document.select(&rule.selector).next()?;
            normalized_text(descend(node, rule)?)
        }
        Selection::Nth { index, min_count } => {
            let nodes: Vec<ElementRef> = document.select(&rule.selector).collect();
            // The count precondition is checked before the index.
            if nodes.len() < min_count {
                return None;
            }
            normalized_text(descend(*nodes.get(index)?, rule)?)
        }
        Selection::Concat => {
            let parts: Vec<String> = document
                .select(&rule.selector)
                .flat_map(|container| match &rule.child {
                    Some(child) => container.select(child).collect::<Vec<_>>(),
                    None => vec![container],
                })
                .filter_map(normalized_text)
                .collect();

            if parts.is_empty() {
                None
            } else {
                Some(parts.join(" "))
            }
        }
    }
}

/// Applies the rule's child selector, if any
fn descend<'a>(node: ElementRef<'a>, rule: &ExtractionRule) -> Option<ElementRef<'a>> {
    match &rule.child {
        Some(child) => node.select(child).next(),
        None => Some(node),
    }
}

/// Text content with whitespace runs collapsed and ends trimmed
fn normalized_text(element: ElementRef) -> Option<String> {
    let raw: String = element.text().collect();
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
