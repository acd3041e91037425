//! Input and finding types shared across the workspace.
//!
//! ## Wire shapes
//!
//! Product records arrive from the front end with Spanish keys
//! (`producto`, `marca`, `modelo`, `capacidad`, `ean`); the English field
//! names are also accepted so the API can be driven from either convention.
//! All attributes are optional; a row with only `producto` set is valid.

use serde::{Deserialize, Serialize};

/// The documented "queried but not determined" sentinel. A vendor cell
/// holding this value is a normal, successful outcome, not an error.
pub const NOT_DETERMINED: &str = "ND";

/// One product to be priced. Immutable input; one per result row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Product {
    /// Free-text product description (e.g., `"Heladera X200"`).
    #[serde(default, alias = "producto")]
    pub name: Option<String>,

    /// Brand name (e.g., `"Whirlpool"`).
    #[serde(default, alias = "marca")]
    pub brand: Option<String>,

    /// Manufacturer model code (e.g., `"WRE58AB"`).
    #[serde(default, alias = "modelo")]
    pub model: Option<String>,

    /// Capacity / size descriptor (e.g., `"364 L"`).
    #[serde(default, alias = "capacidad")]
    pub capacity: Option<String>,

    /// Identifier code (EAN or equivalent). The most specific search term.
    #[serde(default, alias = "ean", alias = "identifierCode")]
    pub identifier_code: Option<String>,
}

/// A vendor: display name plus storefront base URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub name: String,
    #[serde(alias = "url", alias = "baseUrl")]
    pub base_url: String,
}

/// A verified price: localized display text and the canonical integer
/// amount as a digit string (no separators, no decimals, never signed).
/// Both fields are always present together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFinding {
    pub display_text: String,
    pub canonical_amount: String,
}

impl PriceFinding {
    /// Builds a finding only when both halves are non-empty, enforcing the
    /// "both present or both absent" contract at the type boundary.
    #[must_use]
    pub fn new(display_text: String, canonical_amount: String) -> Option<Self> {
        if display_text.is_empty() || canonical_amount.is_empty() {
            return None;
        }
        Some(Self {
            display_text,
            canonical_amount,
        })
    }
}

/// Caller-tunable knobs for one scrape run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeOptions {
    /// Accepted for interface compatibility; the HTTP-only strategies do
    /// not render pages, so this has no effect.
    #[serde(default)]
    pub headless: bool,

    /// Lower bound of the post-request delay window, in seconds.
    #[serde(default = "default_min_delay", alias = "minDelaySecs")]
    pub min_delay_secs: f64,

    /// Upper bound of the post-request delay window, in seconds.
    #[serde(default = "default_max_delay", alias = "maxDelaySecs")]
    pub max_delay_secs: f64,

    /// Reserved: resolve a brand price from the official site. The engine
    /// accepts the flag and always reports `"ND"` for that column.
    #[serde(default, alias = "includeOfficialSite")]
    pub include_official_site: bool,

    /// When set, the response carries the run's trace log.
    #[serde(default, alias = "returnLogs")]
    pub return_logs: bool,
}

fn default_min_delay() -> f64 {
    2.0
}

fn default_max_delay() -> f64 {
    5.0
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            headless: true,
            min_delay_secs: default_min_delay(),
            max_delay_secs: default_max_delay(),
            include_official_site: false,
            return_logs: false,
        }
    }
}
