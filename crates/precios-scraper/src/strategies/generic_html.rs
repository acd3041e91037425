//! Generic HTML search.
//!
//! Discovers the site's own search form from the home page first, then
//! walks a fixed list of common search-path candidates. Each candidate
//! page goes through card verification with the page-wide pattern as last
//! resort. A failing candidate is logged and skipped; only cancellation
//! stops the walk.

use precios_core::PriceFinding;
use scraper::{Html, Selector};

use super::StrategyContext;
use crate::error::ScrapeError;
use crate::verify::{extract_verified_price, page_wide_price};

const SEARCH_PATHS: &[&str] = &["/search", "/buscar", "/busca", "/s", "/busqueda"];

/// `action` of a search form on the home page, resolved against the base
/// URL. Looks for `role="search"` first, then any form whose class
/// mentions "search".
fn search_form_action(html: &str, base_url: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let by_role = Selector::parse("form[role='search']").expect("valid selector");
    let by_class = Selector::parse("form[class*='search']").expect("valid selector");

    let form = document
        .select(&by_role)
        .next()
        .or_else(|| document.select(&by_class).next())?;

    let base = base_url.trim_end_matches('/');
    match form.value().attr("action") {
        Some(action) if action.starts_with("http") => Some(action.to_owned()),
        Some(action) if !action.is_empty() => {
            Some(format!("{base}/{}", action.trim_start_matches('/')))
        }
        _ => Some(format!("{base}/")),
    }
}

async fn probe(
    ctx: &StrategyContext<'_>,
    url: &str,
    params: &[(&str, &str)],
    variants: &[String],
) -> Result<Option<PriceFinding>, ScrapeError> {
    let page = match ctx.client.get(ctx.log, url, params).await {
        Ok(page) => page,
        Err(err) if err.is_cancellation() => return Err(err),
        Err(err) => {
            ctx.log.push(format!("generic-html: {url} failed: {err}"));
            return Ok(None);
        }
    };
    let html = page.text();

    if let Some(finding) = extract_verified_price(&html, variants, ctx.log) {
        ctx.log.push(format!(
            "generic-html verified {url} -> {} ({})",
            finding.display_text, finding.canonical_amount
        ));
        return Ok(Some(finding));
    }
    if let Some(finding) = page_wide_price(&html) {
        ctx.log.push(format!(
            "generic-html page-wide pattern {url} -> {} ({})",
            finding.display_text, finding.canonical_amount
        ));
        return Ok(Some(finding));
    }
    Ok(None)
}

pub(super) async fn attempt(
    ctx: &StrategyContext<'_>,
    base_url: &str,
    term: &str,
    variants: &[String],
) -> Result<Option<PriceFinding>, ScrapeError> {
    let base = base_url.trim_end_matches('/');

    // The site's own search form beats guessing paths.
    let home = format!("{base}/");
    match ctx.client.get(ctx.log, &home, &[]).await {
        Ok(page) => {
            if let Some(action) = search_form_action(&page.text(), base_url) {
                ctx.log.push(format!("generic-html: search form at {action}"));
                for params in [
                    vec![("s", term)],
                    vec![("s", term), ("post_type", "product")],
                ] {
                    if let Some(finding) = probe(ctx, &action, &params, variants).await? {
                        return Ok(Some(finding));
                    }
                }
            }
        }
        Err(err) if err.is_cancellation() => return Err(err),
        Err(err) => ctx.log.push(format!("generic-html: home fetch failed: {err}")),
    }

    for path in SEARCH_PATHS {
        let url = format!("{base}{path}");
        if let Some(finding) = probe(ctx, &url, &[("q", term)], variants).await? {
            return Ok(Some(finding));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_action_is_taken_verbatim_when_absolute() {
        let html = r#"<form role="search" action="https://vendor.example/buscar"></form>"#;
        assert_eq!(
            search_form_action(html, "https://vendor.example").as_deref(),
            Some("https://vendor.example/buscar")
        );
    }

    #[test]
    fn relative_form_action_resolves_against_base() {
        let html = r#"<form class="header-search" action="/resultados"></form>"#;
        assert_eq!(
            search_form_action(html, "https://vendor.example/").as_deref(),
            Some("https://vendor.example/resultados")
        );
    }

    #[test]
    fn form_without_action_falls_back_to_site_root() {
        let html = r#"<form role="search"><input name="s"></form>"#;
        assert_eq!(
            search_form_action(html, "https://vendor.example").as_deref(),
            Some("https://vendor.example/")
        );
    }

    #[test]
    fn page_without_search_form_yields_none() {
        assert_eq!(search_form_action("<form action='/login'></form>", "x"), None);
    }
}
