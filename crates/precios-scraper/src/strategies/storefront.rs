//! Storefront products JSON.
//!
//! Queries the storefront's public products endpoint with a search
//! parameter and matches returned items by title/SKU against the term
//! variants. Some storefronts express prices in minor units; an all-digit
//! string of length ≥ 3 is heuristically treated as cents and divided by
//! 100. That guess can misread legitimately small whole-currency prices
//! and is deliberately left un-hardened.

use precios_core::PriceFinding;
use serde::Deserialize;

use super::StrategyContext;
use crate::error::ScrapeError;
use crate::money::{amount_from_float, format_display, parse_amount};
use crate::terms::text_mentions_any;

const PRODUCTS_PATH: &str = "/products.json";
/// Page-size window, mirroring the structured API's small result cap.
const PAGE_LIMIT: &str = "10";

#[derive(Debug, Deserialize)]
struct StorefrontResponse {
    #[serde(default)]
    products: Vec<StorefrontProduct>,
}

#[derive(Debug, Deserialize)]
struct StorefrontProduct {
    #[serde(default)]
    title: String,
    #[serde(default)]
    sku: Option<String>,
    /// Price may be a JSON number or a string, in major or minor units.
    #[serde(default)]
    price: Option<serde_json::Value>,
    #[serde(default)]
    variants: Vec<StorefrontVariant>,
}

#[derive(Debug, Deserialize)]
struct StorefrontVariant {
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    price: Option<serde_json::Value>,
}

/// Canonical amount from a storefront price field.
fn amount_from_price_field(raw: &serde_json::Value) -> Option<String> {
    match raw {
        serde_json::Value::Number(n) => amount_from_float(n.as_f64()?),
        serde_json::Value::String(s) => {
            let s = s.trim();
            if s.len() >= 3 && s.chars().all(|c| c.is_ascii_digit()) {
                // Minor-unit heuristic (see module docs).
                let cents: f64 = s.parse().ok()?;
                amount_from_float(cents / 100.0)
            } else {
                parse_amount(s)
            }
        }
        _ => None,
    }
}

fn item_matches(product: &StorefrontProduct, variants: &[String]) -> bool {
    if text_mentions_any(&product.title, variants) {
        return true;
    }
    let sku_matches = |sku: &Option<String>| {
        sku.as_deref()
            .is_some_and(|s| text_mentions_any(s, variants))
    };
    sku_matches(&product.sku) || product.variants.iter().any(|v| sku_matches(&v.sku))
}

fn first_price(product: &StorefrontProduct) -> Option<String> {
    if let Some(amount) = product.price.as_ref().and_then(amount_from_price_field) {
        return Some(amount);
    }
    product
        .variants
        .iter()
        .find_map(|v| v.price.as_ref().and_then(amount_from_price_field))
}

pub(super) async fn attempt(
    ctx: &StrategyContext<'_>,
    base_url: &str,
    term: &str,
    variants: &[String],
) -> Result<Option<PriceFinding>, ScrapeError> {
    let url = format!("{}{PRODUCTS_PATH}", base_url.trim_end_matches('/'));
    let page = ctx
        .client
        .get(ctx.log, &url, &[("q", term), ("limit", PAGE_LIMIT)])
        .await?;

    let Ok(response) = serde_json::from_slice::<StorefrontResponse>(&page.body) else {
        return Ok(None);
    };
    if response.products.is_empty() {
        ctx.log.push("storefront-json: no results");
        return Ok(None);
    }

    for product in &response.products {
        if !item_matches(product, variants) {
            continue;
        }
        if let Some(amount) = first_price(product) {
            if let Some(finding) = PriceFinding::new(format_display(&amount), amount) {
                ctx.log.push(format!(
                    "storefront-json: {} -> {} ({})",
                    product.title, finding.display_text, finding.canonical_amount
                ));
                return Ok(Some(finding));
            }
        }
    }

    Ok(None)
}
