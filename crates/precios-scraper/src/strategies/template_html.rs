//! Template catalog-search HTML.
//!
//! One GET against the platform's fixed catalog-search path, card
//! verification over the result, page-wide pattern as last resort.

use precios_core::PriceFinding;

use super::StrategyContext;
use crate::error::ScrapeError;
use crate::verify::{extract_verified_price, page_wide_price};

const SEARCH_PATH: &str = "/catalogsearch/result/";

pub(super) async fn attempt(
    ctx: &StrategyContext<'_>,
    base_url: &str,
    term: &str,
    variants: &[String],
) -> Result<Option<PriceFinding>, ScrapeError> {
    let url = format!("{}{SEARCH_PATH}", base_url.trim_end_matches('/'));
    let page = ctx.client.get(ctx.log, &url, &[("q", term)]).await?;
    let html = page.text();

    if let Some(finding) = extract_verified_price(&html, variants, ctx.log) {
        ctx.log.push(format!(
            "template-html verified -> {} ({})",
            finding.display_text, finding.canonical_amount
        ));
        return Ok(Some(finding));
    }

    // Last resort; forfeits the card-verification guarantee.
    if let Some(finding) = page_wide_price(&html) {
        ctx.log.push(format!(
            "template-html page-wide pattern -> {} ({})",
            finding.display_text, finding.canonical_amount
        ));
        return Ok(Some(finding));
    }

    Ok(None)
}
