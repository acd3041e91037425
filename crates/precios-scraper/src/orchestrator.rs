//! The scrape orchestrator.
//!
//! For every (product, vendor) pair, term variants are tried
//! most-specific-first against the vendor's routed strategy chain until a
//! verified price is found or everything is exhausted. Work is strictly
//! sequential (product by product, vendor by vendor, term by term,
//! strategy by strategy) because the fetcher's randomized delay is the
//! anti-bot throttle and parallel requests would defeat it.

use std::sync::Arc;

use chrono::Local;
use precios_core::{
    validate_input, PriceFinding, Product, ResultRow, ResultTable, ScrapeOptions, Vendor,
    VendorCell,
};

use crate::cancel::CancelToken;
use crate::capability::{FallbackTransport, NoOcr, OcrEngine};
use crate::error::ScrapeError;
use crate::fetch::PageClient;
use crate::log::ScrapeLog;
use crate::router::strategy_order;
use crate::strategies::{self, StrategyContext};
use crate::terms::{match_variants, variants};

/// The outcome of one run: the table plus the run-scoped trace log.
#[derive(Debug)]
pub struct ScrapeReport {
    pub table: ResultTable,
    pub log: Vec<String>,
}

/// The price-resolution engine. Construct once per configuration; each
/// [`Self::scrape_all`] call builds its own HTTP client and log so no
/// header/cookie identity or trace lines leak across runs.
pub struct PriceScraper {
    options: ScrapeOptions,
    request_timeout_secs: u64,
    ocr: Arc<dyn OcrEngine>,
    fallback: Option<Arc<dyn FallbackTransport>>,
}

impl PriceScraper {
    #[must_use]
    pub fn new(options: ScrapeOptions) -> Self {
        Self {
            options,
            request_timeout_secs: 25,
            ocr: Arc::new(NoOcr),
            fallback: None,
        }
    }

    #[must_use]
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Installs an OCR backend for scanned brochures.
    #[must_use]
    pub fn with_ocr(mut self, ocr: Arc<dyn OcrEngine>) -> Self {
        self.ocr = ocr;
        self
    }

    /// Installs the browser-impersonation transport used on 403 responses.
    #[must_use]
    pub fn with_fallback_transport(mut self, transport: Arc<dyn FallbackTransport>) -> Self {
        self.fallback = Some(transport);
        self
    }

    /// Resolves a price for every (product, vendor) pair and assembles the
    /// result table.
    ///
    /// "Nothing found" is a normal outcome; the cell reads `"ND"`. The
    /// run fails only on structurally invalid input or cancellation; a
    /// cancelled run returns no partial table.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::InvalidInput`] for a bad input shape,
    /// [`ScrapeError::Cancelled`] when the token trips, or
    /// [`ScrapeError::Http`] if the per-run HTTP client cannot be built.
    pub async fn scrape_all(
        &self,
        products: &[Product],
        vendors: &[Vendor],
        cancel: &CancelToken,
    ) -> Result<ScrapeReport, ScrapeError> {
        validate_input(products, vendors)?;

        let log = ScrapeLog::new();
        let client = PageClient::new(
            self.request_timeout_secs,
            (self.options.min_delay_secs, self.options.max_delay_secs),
            cancel.clone(),
            self.fallback.clone(),
        )?;
        let ctx = StrategyContext {
            client: &client,
            log: &log,
            ocr: &*self.ocr,
        };

        let query_date = Local::now().format("%d/%m/%Y").to_string();
        let mut table = ResultTable::new(vendors.iter().map(|v| v.name.clone()).collect());

        for product in products {
            let mut row = ResultRow::new(product, query_date.clone());
            let terms = variants(product);
            if terms.is_empty() {
                log.push("product without usable attributes, all cells ND".to_owned());
            }

            for vendor in vendors {
                if cancel.is_cancelled() {
                    return Err(ScrapeError::Cancelled);
                }
                let finding = self.resolve_vendor(&ctx, vendor, &terms).await?;
                row.cells
                    .push(VendorCell::from_finding(&vendor.name, finding));
            }

            table.rows.push(row);
        }

        Ok(ScrapeReport {
            table,
            log: log.into_lines(),
        })
    }

    /// Runs the vendor's strategy chain over each term until the first
    /// verified finding; both loops short-circuit on success.
    async fn resolve_vendor(
        &self,
        ctx: &StrategyContext<'_>,
        vendor: &Vendor,
        terms: &[String],
    ) -> Result<Option<PriceFinding>, ScrapeError> {
        let order = strategy_order(&vendor.name);

        for term in terms {
            let term_variants = match_variants(term);
            for kind in order {
                ctx.log.push(format!(
                    "[{}] strategy={} term={term}",
                    vendor.name,
                    kind.label()
                ));
                if let Some(finding) = strategies::run(
                    *kind,
                    ctx,
                    &vendor.base_url,
                    term,
                    &term_variants,
                )
                .await?
                {
                    ctx.log.push(format!(
                        "[{}] found -> {} ({})",
                        vendor.name, finding.display_text, finding.canonical_amount
                    ));
                    return Ok(Some(finding));
                }
            }
        }

        Ok(None)
    }
}

impl std::fmt::Debug for PriceScraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceScraper")
            .field("options", &self.options)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("has_fallback", &self.fallback.is_some())
            .finish_non_exhaustive()
    }
}
