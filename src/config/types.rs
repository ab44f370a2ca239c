use crate::review::Field;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Main configuration structure for the harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    pub output: OutputConfig,
    pub rules: RulesConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Scheme and host every relative link is joined against
    pub origin: String,

    /// Listing path template; `{page}` is replaced with the page number
    #[serde(default = "default_listing_path")]
    pub listing_path: String,
}

/// Page range and concurrency bounds
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HarvestConfig {
    /// First listing page (1-based)
    #[serde(default = "default_start_page")]
    pub start_page: u32,

    /// Last listing page, inclusive
    pub end_page: u32,

    /// Maximum number of listing pages processed at once
    #[serde(default = "default_page_concurrency")]
    pub page_concurrency: usize,

    /// Maximum number of detail fetches in flight per listing page
    #[serde(default = "default_detail_concurrency")]
    pub detail_concurrency: usize,

    /// Skip review links another page of the same run has already claimed
    ///
    /// A claim is held while the review is fetched and stored, and given back if
    /// that fails, so a later page listing the same link tries it again.
    #[serde(default)]
    pub dedupe_urls: bool,
}

impl HarvestConfig {
    pub fn pages(&self) -> RangeInclusive<u32> {
        self.start_page..=self.end_page
    }

    pub fn page_count(&self) -> u64 {
        if self.end_page < self.start_page {
            0
        } else {
            u64::from(self.end_page - self.start_page) + 1
        }
    }
}

/// HTTP client and retry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FetchConfig {
    /// Whole-request timeout (milliseconds)
    pub timeout_ms: u64,

    /// TCP connect timeout (milliseconds)
    pub connect_timeout_ms: u64,

    /// Total attempts per URL, including the first
    pub max_attempts: u32,

    /// Delay before the first retry (milliseconds), doubled on each further retry
    pub backoff_base_ms: u64,

    /// Upper bound for a single backoff delay (milliseconds)
    pub backoff_max_ms: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            max_attempts: 3,
            backoff_base_ms: 500,
            backoff_max_ms: 8_000,
            user_agent: format!("review-harvester/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite database file
    pub database_path: String,
}

/// The extraction rule table
#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    /// How review links are found on a listing page
    pub listing: LinkRuleSpec,

    /// One rule per review field
    pub fields: BTreeMap<Field, RuleSpec>,
}

/// Locates review links on a listing page
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LinkRuleSpec {
    pub tag: String,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    /// Attribute holding the link target
    #[serde(default = "default_link_attribute")]
    pub attribute: String,
}

/// Locates one field on a detail page
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuleSpec {
    /// Element name to match
    pub tag: String,

    /// Space-separated classes the element must carry
    #[serde(default)]
    pub class: Option<String>,

    /// Exact attribute values the element must carry
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    /// Descendant to read instead of the matched element
    #[serde(default)]
    pub child: Option<String>,

    #[serde(default)]
    pub select: SelectMode,

    /// Position in the match list, for `select = "nth"`
    #[serde(default)]
    pub index: Option<usize>,

    /// Matches required before `index` is consulted, for `select = "nth"`
    #[serde(default)]
    pub min_count: Option<usize>,
}

/// How a rule turns its matches into a value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectMode {
    /// First match in document order
    #[default]
    First,
    /// The match at `index`
    Nth,
    /// Every `child` of every match, joined with single spaces
    Concat,
}

fn default_listing_path() -> String {
    "/reviews/albums/?page={page}".to_string()
}

fn default_start_page() -> u32 {
    1
}

fn default_page_concurrency() -> usize {
    10
}

fn default_detail_concurrency() -> usize {
    5
}

fn default_link_attribute() -> String {
    "href".to_string()
}
