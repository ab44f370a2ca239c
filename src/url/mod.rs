//! URL construction for listing and review pages
//!
//! Listing URLs come from the configured path template; review URLs are the
//! relative links found on listing pages, joined with the site origin.

use crate::{UrlError, UrlResult};
use url::Url;

/// Parses and checks the site origin
pub fn parse_origin(origin: &str) -> UrlResult<Url> {
    let url = Url::parse(origin).map_err(|e| UrlError::Parse(format!("{}: {}", origin, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Builds the URL of a listing page
///
/// # Example
///
/// ```
/// use review_harvester::url::listing_url;
/// use url::Url;
///
/// let origin = Url::parse("https://example.com").unwrap();
/// let url = listing_url(&origin, "/reviews/albums/?page={page}", 7).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/reviews/albums/?page=7");
/// ```
pub fn listing_url(origin: &Url, template: &str, page: u32) -> UrlResult<Url> {
    if !template.contains("{page}") {
        return Err(UrlError::Template(template.to_string()));
    }

    let path = template.replace("{page}", &page.to_string());
    origin
        .join(&path)
        .map_err(|e| UrlError::Parse(format!("{}: {}", path, e)))
}

/// Resolves a link target found on a listing page against the origin
///
/// Returns None if the link should be skipped:
/// - empty or fragment-only targets
/// - javascript:, mailto:, tel: and data: targets
/// - targets that do not resolve to an http(s) URL
pub fn resolve_href(origin: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match origin.join(href) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
        _ => None,
    }
}
