//! Card-scoped price verification.
//!
//! A page-wide price-pattern search produces false positives: promotional
//! banners, "related products" rails, shipping thresholds. Prices are
//! therefore only taken from a product card whose own text (or a known
//! title sub-element) mentions the search term under the token-subset
//! rule. The page-wide pattern match exists only as an explicit last
//! resort for the calling strategy, which forfeits the verification
//! guarantee by using it.
//!
//! All parsing happens synchronously inside this module so no parsed
//! document is ever held across an `await`.

use precios_core::PriceFinding;
use scraper::{ElementRef, Html, Selector};

use crate::log::ScrapeLog;
use crate::money::{format_display, parse_amount, price_pattern};
use crate::terms::{normalize_spaces, text_mentions_any};

/// Product-card container selectors seen across the supported platforms.
const CARD_SELECTORS: &[&str] = &[
    ".product-item",
    "li.product",
    ".product",
    ".product-card",
    ".grid-item",
    ".product-box",
    ".vtex-product-summary-2-x-container",
    ".ais-InfiniteHits-item",
];

/// Title/name sub-elements checked when the card's full text alone does
/// not mention the term.
const TITLE_SELECTORS: &[&str] = &[
    ".product-name",
    ".product-title",
    ".vtex-product-summary-2-x-productBrand",
    ".vtex-product-summary-2-x-productNameContainer",
    "h1",
    "h2",
    "h3",
    "a[title]",
];

/// Price-bearing selectors, in priority order.
const PRICE_SELECTORS: &[&str] = &[
    ".price",
    ".product-price",
    ".prices",
    ".vtex-product-price-1-x-sellingPrice",
    ".woocommerce-Price-amount.amount",
    "[class*='price']",
    "[class*='precio']",
    "span[data-price]",
];

fn element_text(element: ElementRef<'_>) -> String {
    normalize_spaces(&element.text().collect::<Vec<_>>().join(" "))
}

/// Builds a finding from raw price text; `None` unless both the canonical
/// amount and its display rendering come out non-empty.
pub(crate) fn finding_from_text(text: &str) -> Option<PriceFinding> {
    let amount = parse_amount(text)?;
    PriceFinding::new(format_display(&amount), amount)
}

fn card_mentions_term(card: ElementRef<'_>, variants: &[String]) -> bool {
    if text_mentions_any(&element_text(card), variants) {
        return true;
    }
    TITLE_SELECTORS.iter().any(|ts| {
        let selector = Selector::parse(ts).expect("valid selector");
        card.select(&selector)
            .next()
            .is_some_and(|title| text_mentions_any(&element_text(title), variants))
    })
}

fn price_within_card(card: ElementRef<'_>) -> Option<(PriceFinding, &'static str)> {
    for ps in PRICE_SELECTORS {
        let selector = Selector::parse(ps).expect("valid selector");
        if let Some(element) = card.select(&selector).next() {
            if let Some(finding) = finding_from_text(&element_text(element)) {
                return Some((finding, ps));
            }
        }
    }
    // No price selector hit; fall back to the monetary pattern, scoped to
    // this card's own text.
    let card_text = element_text(card);
    let matched = price_pattern().find(&card_text)?;
    finding_from_text(matched.as_str()).map(|finding| (finding, "pattern"))
}

/// Scans the page for a product card that mentions the term and extracts a
/// price from inside that card only.
#[must_use]
pub fn extract_verified_price(
    html: &str,
    variants: &[String],
    log: &ScrapeLog,
) -> Option<PriceFinding> {
    let document = Html::parse_document(html);
    for cs in CARD_SELECTORS {
        let selector = Selector::parse(cs).expect("valid selector");
        for card in document.select(&selector) {
            if !card_mentions_term(card, variants) {
                continue;
            }
            if let Some((finding, source)) = price_within_card(card) {
                log.push(format!(
                    "card {cs} {source} -> {} ({})",
                    finding.display_text, finding.canonical_amount
                ));
                return Some(finding);
            }
        }
    }
    None
}

/// Page-wide monetary-pattern match. No association with the queried
/// product is established. Last resort only.
#[must_use]
pub fn page_wide_price(html: &str) -> Option<PriceFinding> {
    let document = Html::parse_document(html);
    let text = element_text(document.root_element());
    let matched = price_pattern().find(&text)?;
    finding_from_text(matched.as_str())
}
