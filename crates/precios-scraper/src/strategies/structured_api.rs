//! Structured product-search API.
//!
//! Queries the platform's fixed full-text search endpoint with a small
//! page window and walks each record's seller offers for the first
//! positive price, falling back to the price-range low. The API is
//! query-scoped, so no card verification applies here.

use precios_core::PriceFinding;
use serde::Deserialize;

use super::StrategyContext;
use crate::error::ScrapeError;
use crate::money::{amount_from_float, format_display};

const SEARCH_PATH: &str = "/api/catalog_system/pub/products/search";

#[derive(Debug, Deserialize)]
struct CatalogProduct {
    #[serde(default)]
    items: Vec<CatalogItem>,
    #[serde(default, rename = "priceRange")]
    price_range: Option<PriceRange>,
}

#[derive(Debug, Deserialize)]
struct CatalogItem {
    #[serde(default)]
    sellers: Vec<Seller>,
}

#[derive(Debug, Deserialize)]
struct Seller {
    // The platform's own misspelling; it is the real field name on the wire.
    #[serde(default, rename = "commertialOffer")]
    commertial_offer: Option<Offer>,
}

#[derive(Debug, Deserialize)]
struct Offer {
    #[serde(default, rename = "Price")]
    price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PriceRange {
    #[serde(default, rename = "sellingPrice")]
    selling_price: Option<SellingPrice>,
}

#[derive(Debug, Deserialize)]
struct SellingPrice {
    #[serde(default, rename = "lowPrice")]
    low_price: Option<f64>,
}

fn finding_from_amount(value: f64) -> Option<PriceFinding> {
    let amount = amount_from_float(value)?;
    PriceFinding::new(format_display(&amount), amount)
}

pub(super) async fn attempt(
    ctx: &StrategyContext<'_>,
    base_url: &str,
    term: &str,
) -> Result<Option<PriceFinding>, ScrapeError> {
    let api = format!("{}{SEARCH_PATH}", base_url.trim_end_matches('/'));
    let page = ctx
        .client
        .get(ctx.log, &api, &[("_from", "0"), ("_to", "9"), ("ft", term)])
        .await?;

    let Ok(products) = serde_json::from_slice::<Vec<CatalogProduct>>(&page.body) else {
        // Not the expected array shape; this vendor is not on this platform.
        return Ok(None);
    };
    if products.is_empty() {
        ctx.log.push("structured-api: no results");
        return Ok(None);
    }

    for product in &products {
        for item in &product.items {
            for seller in &item.sellers {
                if let Some(price) = seller.commertial_offer.as_ref().and_then(|o| o.price) {
                    if price > 0.0 {
                        if let Some(finding) = finding_from_amount(price) {
                            ctx.log.push(format!("structured-api: price={price}"));
                            return Ok(Some(finding));
                        }
                    }
                }
            }
        }
    }

    for product in &products {
        let low = product
            .price_range
            .as_ref()
            .and_then(|pr| pr.selling_price.as_ref())
            .and_then(|sp| sp.low_price);
        if let Some(low) = low {
            if let Some(finding) = finding_from_amount(low) {
                ctx.log.push(format!("structured-api: lowPrice={low}"));
                return Ok(Some(finding));
            }
        }
    }

    Ok(None)
}
