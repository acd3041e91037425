//! Platform extraction strategies.
//!
//! Five independent algorithms, one per platform family. Each attempt
//! returns `Ok(Some(finding))`, `Ok(None)` for "no match", or an error.
//! [`run`] is the strategy boundary: every failure except cancellation is
//! absorbed there (logged, converted to "no match") so one bad endpoint
//! never sinks the chain.

mod brochure;
mod generic_html;
mod storefront;
mod structured_api;
mod template_html;

use precios_core::PriceFinding;

use crate::capability::OcrEngine;
use crate::error::ScrapeError;
use crate::fetch::PageClient;
use crate::log::ScrapeLog;

/// Everything a strategy needs for one run.
pub(crate) struct StrategyContext<'a> {
    pub client: &'a PageClient,
    pub log: &'a ScrapeLog,
    pub ocr: &'a dyn OcrEngine,
}

/// Strategy identifiers, routable per vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Fixed product-search API returning JSON product records.
    StructuredApi,
    /// Server-rendered catalog-search HTML.
    TemplateHtml,
    /// Storefront products JSON endpoint.
    StorefrontJson,
    /// Common search-path candidates over plain HTML.
    GenericHtml,
    /// Promotional brochure / PDF crawl.
    Brochure,
}

impl StrategyKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::StructuredApi => "structured-api",
            Self::TemplateHtml => "template-html",
            Self::StorefrontJson => "storefront-json",
            Self::GenericHtml => "generic-html",
            Self::Brochure => "brochure",
        }
    }
}

/// Runs one strategy for one (vendor, term) pair, absorbing everything
/// but cancellation at this boundary.
///
/// # Errors
///
/// Only [`ScrapeError::Cancelled`] escapes.
pub(crate) async fn run(
    kind: StrategyKind,
    ctx: &StrategyContext<'_>,
    base_url: &str,
    term: &str,
    variants: &[String],
) -> Result<Option<PriceFinding>, ScrapeError> {
    let outcome = match kind {
        StrategyKind::StructuredApi => structured_api::attempt(ctx, base_url, term).await,
        StrategyKind::TemplateHtml => template_html::attempt(ctx, base_url, term, variants).await,
        StrategyKind::StorefrontJson => storefront::attempt(ctx, base_url, term, variants).await,
        StrategyKind::GenericHtml => generic_html::attempt(ctx, base_url, term, variants).await,
        StrategyKind::Brochure => brochure::attempt(ctx, base_url, term).await,
    };

    match outcome {
        Ok(finding) => Ok(finding),
        Err(err) if err.is_cancellation() => Err(err),
        Err(err) => {
            ctx.log.push(format!("{} failed: {err}", kind.label()));
            tracing::warn!(strategy = kind.label(), error = %err, "strategy attempt failed");
            Ok(None)
        }
    }
}
