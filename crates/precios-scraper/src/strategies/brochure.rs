//! Promotional brochure / PDF crawl.
//!
//! Crawls the vendor's home page plus the usual promotional paths,
//! collecting every linked or embedded PDF, including PDFs hidden inside
//! messaging-app share links (`wa.me/?text=...`). Each document (capped
//! at 12) is downloaded and its text extracted; implausibly short text
//! triggers the injected OCR backend. A finding requires the term to
//! appear literally in the document with a monetary pattern inside a
//! ±200 character window around it; proximity stands in for the card
//! verifier's structural check.

use std::collections::HashSet;

use precios_core::PriceFinding;
use percent_encoding::percent_decode_str;
use scraper::{Html, Selector};

use super::StrategyContext;
use crate::error::ScrapeError;
use crate::money::{format_display, parse_amount, price_pattern};
use crate::terms::embedded_pdf_url;

const PROMO_PATHS: &[&str] = &[
    "ofertas",
    "oferta",
    "promociones",
    "folleto",
    "folletos",
    "catalogo",
    "catalogos",
];
const MAX_DOCUMENTS: usize = 12;
const PROXIMITY_WINDOW: usize = 200;
/// Below this many extracted characters the PDF is assumed to be scanned
/// imagery and OCR is attempted.
const MIN_EXTRACTED_CHARS: usize = 32;

fn resolve(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_owned()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            href.trim_start_matches('/')
        )
    }
}

/// PDF URL buried in a messaging-app share link's `text` parameter.
fn pdf_from_share_link(href: &str) -> Option<String> {
    let query = href.split_once('?').map(|(_, q)| q)?;
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key != "text" {
            continue;
        }
        let decoded = percent_decode_str(&value.replace('+', " "))
            .decode_utf8()
            .ok()?
            .into_owned();
        if let Some(url) = embedded_pdf_url(&decoded) {
            return Some(url);
        }
    }
    None
}

/// Collects PDF links from anchors, share links, and iframe embeds.
fn collect_pdf_links(html: &str, base_url: &str, seen: &mut HashSet<String>, out: &mut Vec<String>) {
    let document = Html::parse_document(html);

    let anchors = Selector::parse("a[href]").expect("valid selector");
    for anchor in document.select(&anchors) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let link = if href.contains("wa.me/?") {
            pdf_from_share_link(href)
        } else if href.to_lowercase().ends_with(".pdf") {
            Some(resolve(base_url, href))
        } else {
            None
        };
        if let Some(link) = link {
            if seen.insert(link.clone()) {
                out.push(link);
            }
        }
    }

    let iframes = Selector::parse("iframe[src]").expect("valid selector");
    for iframe in document.select(&iframes) {
        let Some(src) = iframe.value().attr("src") else {
            continue;
        };
        if src.to_lowercase().ends_with(".pdf") {
            let link = resolve(base_url, src);
            if seen.insert(link.clone()) {
                out.push(link);
            }
        }
    }
}

/// Extracts document text, falling back to OCR when the embedded text is
/// implausibly short. Both paths are best-effort; the worst case is an
/// empty string, which simply yields no match.
fn document_text(ctx: &StrategyContext<'_>, url: &str, body: &[u8]) -> String {
    let text = match pdf_extract::extract_text_from_mem(body) {
        Ok(text) => text,
        Err(err) => {
            ctx.log.push(format!("PDF error {err} {url}"));
            String::new()
        }
    };
    if text.trim().len() >= MIN_EXTRACTED_CHARS {
        ctx.log.push(format!("PDF extracted ({} chars) {url}", text.len()));
        return text;
    }
    match ctx.ocr.recognize(body) {
        Some(recognized) if recognized.trim().len() > text.trim().len() => {
            ctx.log.push(format!("PDF OCR ({} chars) {url}", recognized.len()));
            recognized
        }
        _ => text,
    }
}

fn snap_down(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn snap_up(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// Price pattern within ±`PROXIMITY_WINDOW` characters of a term
/// occurrence. Matching is done over the lowercased text so the window and
/// the occurrence check agree on positions.
fn price_near_term(lower: &str, term_lower: &str) -> Option<PriceFinding> {
    for matched in price_pattern().find_iter(lower) {
        let start = snap_down(lower, matched.start().saturating_sub(PROXIMITY_WINDOW));
        let end = snap_up(lower, (matched.start() + PROXIMITY_WINDOW).min(lower.len()));
        if lower[start..end].contains(term_lower) {
            let amount = parse_amount(matched.as_str())?;
            if let Some(finding) = PriceFinding::new(format_display(&amount), amount) {
                return Some(finding);
            }
        }
    }
    None
}

pub(super) async fn attempt(
    ctx: &StrategyContext<'_>,
    base_url: &str,
    term: &str,
) -> Result<Option<PriceFinding>, ScrapeError> {
    let base = base_url.trim_end_matches('/');
    let mut pages = vec![base_url.to_owned()];
    pages.extend(PROMO_PATHS.iter().map(|p| format!("{base}/{p}")));

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for page_url in &pages {
        match ctx.client.get(ctx.log, page_url, &[]).await {
            Ok(page) => collect_pdf_links(&page.text(), base_url, &mut seen, &mut links),
            Err(err) if err.is_cancellation() => return Err(err),
            Err(err) => ctx.log.push(format!("brochure: {page_url} failed: {err}")),
        }
    }

    let term_lower = term.to_lowercase();
    for link in links.iter().take(MAX_DOCUMENTS) {
        let document = match ctx.client.get(ctx.log, link, &[]).await {
            Ok(page) => page,
            Err(err) if err.is_cancellation() => return Err(err),
            Err(err) => {
                ctx.log.push(format!("brochure: {link} failed: {err}"));
                continue;
            }
        };

        let text = document_text(ctx, link, &document.body);
        if text.is_empty() {
            continue;
        }
        let lower = text.to_lowercase();
        if !lower.contains(&term_lower) {
            continue;
        }
        if let Some(finding) = price_near_term(&lower, &term_lower) {
            ctx.log.push(format!(
                "brochure verified {link} -> {} ({})",
                finding.display_text, finding.canonical_amount
            ));
            return Ok(Some(finding));
        }
    }

    Ok(None)
}
