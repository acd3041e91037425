//! Integration tests for the price-resolution engine.
//!
//! Uses `wiremock` to stand up a local HTTP server per vendor so no real
//! network traffic is made. Covers the end-to-end platform scenarios, the
//! orchestrator's short-circuit behavior, cancellation, and the 403
//! fallback transport. The delay window is zeroed throughout.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use precios_core::{Product, ScrapeOptions, Vendor};
use precios_scraper::{
    CancelToken, FallbackTransport, FetchedPage, OcrEngine, PageClient, PriceScraper, ScrapeError,
    ScrapeLog,
};

fn no_delay_options() -> ScrapeOptions {
    ScrapeOptions {
        min_delay_secs: 0.0,
        max_delay_secs: 0.0,
        ..ScrapeOptions::default()
    }
}

fn test_scraper() -> PriceScraper {
    PriceScraper::new(no_delay_options()).with_request_timeout(5)
}

fn vendor(name: &str, server: &MockServer) -> Vendor {
    Vendor {
        name: name.to_owned(),
        base_url: server.uri(),
    }
}

fn named_product(name: &str) -> Product {
    Product {
        name: Some(name.to_owned()),
        ..Product::default()
    }
}

/// Structured-API fixture: one product record with one seller offer.
fn catalog_body(price: f64) -> serde_json::Value {
    json!([{
        "items": [{
            "sellers": [{
                "commertialOffer": { "Price": price }
            }]
        }]
    }])
}

// ---------------------------------------------------------------------------
// Scenario 1 – structured-API vendor resolves the price
// ---------------------------------------------------------------------------

#[tokio::test]
async fn structured_api_vendor_resolves_display_and_canonical_amount() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/products/search"))
        .and(query_param("ft", "Heladera X200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&catalog_body(123_456.00)))
        .mount(&server)
        .await;

    let report = test_scraper()
        .scrape_all(
            &[named_product("Heladera X200")],
            &[vendor("TestVendor", &server)],
            &CancelToken::none(),
        )
        .await
        .expect("scrape should succeed");

    let cell = &report.table.rows[0].cells[0];
    assert_eq!(cell.display, "$ 123.456,00");
    assert_eq!(cell.amount, "123456");
}

// ---------------------------------------------------------------------------
// Scenario 2 – HTML search page with one verified card
// ---------------------------------------------------------------------------

#[tokio::test]
async fn template_html_card_price_is_verified_and_truncated() {
    let server = MockServer::start().await;

    let html = r#"
        <html><body>
          <div class="product-item">
            <h2>Heladera X200 No Frost</h2>
            <span class="price">$1.234,99</span>
          </div>
        </body></html>
    "#;

    // The structured API is not on this vendor (404); the template search is.
    Mock::given(method("GET"))
        .and(path("/catalogsearch/result/"))
        .and(query_param("q", "Heladera X200"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;

    let report = test_scraper()
        .scrape_all(
            &[named_product("Heladera X200")],
            &[vendor("TestVendor", &server)],
            &CancelToken::none(),
        )
        .await
        .expect("scrape should succeed");

    let cell = &report.table.rows[0].cells[0];
    assert_eq!(cell.amount, "1234", "decimals must be truncated");
    assert_eq!(cell.display, "$ 1.234,00");
}

// ---------------------------------------------------------------------------
// Scenario 3 – exhaustion is a normal "ND" outcome, per vendor
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exhausted_vendor_reads_nd_while_others_resolve() {
    let resolving = MockServer::start().await;
    let empty = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/products/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&catalog_body(50_000.0)))
        .mount(&resolving)
        .await;
    // `empty` answers nothing: every strategy sees 404 and gives up.

    let report = test_scraper()
        .scrape_all(
            &[named_product("Heladera X200")],
            &[vendor("Resuelve", &resolving), vendor("Vacio", &empty)],
            &CancelToken::none(),
        )
        .await
        .expect("exhaustion must not be an error");

    let row = &report.table.rows[0];
    assert_eq!(row.cells.len(), 2, "every vendor column is present");
    assert_eq!(row.cells[0].display, "$ 50.000,00");
    assert_eq!(row.cells[0].amount, "50000");
    assert_eq!(row.cells[1].display, "ND");
    assert_eq!(row.cells[1].amount, "");
    assert_eq!(row.marca_sitio_oficial, "ND");
}

// ---------------------------------------------------------------------------
// Orchestrator short-circuit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_match_stops_all_further_terms_and_strategies() {
    let server = MockServer::start().await;

    let product = Product {
        name: Some("Heladera Frio X200".to_owned()),
        brand: Some("Frio".to_owned()),
        model: Some("X200".to_owned()),
        ..Product::default()
    };
    // Three term variants exist (brand+model, model, name); the first
    // strategy matches the first term, so exactly one request may go out.
    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/products/search"))
        .and(query_param("ft", "Frio X200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&catalog_body(77_777.0)))
        .expect(1)
        .mount(&server)
        .await;

    let report = test_scraper()
        .scrape_all(
            &[product],
            &[vendor("TestVendor", &server)],
            &CancelToken::none(),
        )
        .await
        .expect("scrape should succeed");

    assert_eq!(report.table.rows[0].cells[0].amount, "77777");
    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        requests.len(),
        1,
        "no further strategy or term may be attempted after a find"
    );
}

// ---------------------------------------------------------------------------
// Storefront-JSON minor-unit heuristic
// ---------------------------------------------------------------------------

#[tokio::test]
async fn storefront_vendor_divides_minor_unit_prices_by_100() {
    let server = MockServer::start().await;

    // CheekSA routes storefront-JSON first.
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("q", "Heladera X200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "products": [{
                "title": "Heladera X200",
                "price": "123456"
            }]
        })))
        .mount(&server)
        .await;

    let report = test_scraper()
        .scrape_all(
            &[named_product("Heladera X200")],
            &[vendor("CheekSA", &server)],
            &CancelToken::none(),
        )
        .await
        .expect("scrape should succeed");

    let cell = &report.table.rows[0].cells[0];
    assert_eq!(cell.amount, "1234", "all-digit string of length >= 3 is cents");
    assert_eq!(cell.display, "$ 1.234,00");
}

// ---------------------------------------------------------------------------
// Brochure strategy with an injected OCR backend
// ---------------------------------------------------------------------------

struct CannedOcr(&'static str);

impl OcrEngine for CannedOcr {
    fn recognize(&self, _document: &[u8]) -> Option<String> {
        Some(self.0.to_owned())
    }
}

#[tokio::test]
async fn brochure_vendor_recovers_scanned_price_through_ocr() {
    let server = MockServer::start().await;

    // Vital routes brochures first. The home page links one PDF whose
    // embedded text is unreadable, forcing the OCR path.
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><a href="/folletos/agosto.pdf">Folleto de agosto</a></body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/folletos/agosto.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 not really a pdf".to_vec()),
        )
        .mount(&server)
        .await;

    let scraper = test_scraper().with_ocr(Arc::new(CannedOcr(
        "Gran oferta Cafetera Turbo $ 111.222 valido todo agosto",
    )));
    let report = scraper
        .scrape_all(
            &[named_product("Cafetera Turbo")],
            &[vendor("Vital", &server)],
            &CancelToken::none(),
        )
        .await
        .expect("scrape should succeed");

    let cell = &report.table.rows[0].cells[0];
    assert_eq!(cell.amount, "111222");
}

#[tokio::test]
async fn brochure_without_ocr_backend_degrades_to_nd() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><a href="/folletos/agosto.pdf">Folleto</a></body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/folletos/agosto.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 not really a pdf".to_vec()),
        )
        .mount(&server)
        .await;

    let report = test_scraper()
        .scrape_all(
            &[named_product("Cafetera Turbo")],
            &[vendor("Vital", &server)],
            &CancelToken::none(),
        )
        .await
        .expect("a missing OCR backend must not fail the run");

    assert_eq!(report.table.rows[0].cells[0].display, "ND");
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancellation_mid_run_aborts_without_partial_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/products/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&catalog_body(1_000.0)))
        .mount(&server)
        .await;

    // Polls run: vendor-1 loop top, vendor-1 request, vendor-2 loop top.
    // Flipping on the third poll cancels between the two vendors.
    let polls = Arc::new(AtomicUsize::new(0));
    let counting = Arc::clone(&polls);
    let cancel = CancelToken::from_fn(move || counting.fetch_add(1, Ordering::SeqCst) >= 2);

    let result = test_scraper()
        .scrape_all(
            &[named_product("Heladera X200")],
            &[vendor("Primero", &server), vendor("Segundo", &server)],
            &cancel,
        )
        .await;

    assert!(
        matches!(result, Err(ScrapeError::Cancelled)),
        "expected Cancelled, got: {result:?}"
    );
    assert!(polls.load(Ordering::SeqCst) >= 3, "token must be polled");
}

#[tokio::test]
async fn pre_cancelled_token_sends_no_request() {
    let server = MockServer::start().await;

    let result = test_scraper()
        .scrape_all(
            &[named_product("Heladera X200")],
            &[vendor("TestVendor", &server)],
            &CancelToken::from_fn(|| true),
        )
        .await;

    assert!(matches!(result, Err(ScrapeError::Cancelled)));
    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty(), "cancelled run must not touch the network");
}

// ---------------------------------------------------------------------------
// Structured failure vs. "ND"
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_product_list_is_a_structured_failure() {
    let server = MockServer::start().await;

    let result = test_scraper()
        .scrape_all(&[], &[vendor("TestVendor", &server)], &CancelToken::none())
        .await;

    assert!(matches!(result, Err(ScrapeError::InvalidInput(_))));
}

#[tokio::test]
async fn duplicate_vendor_names_are_a_structured_failure() {
    let server = MockServer::start().await;

    let result = test_scraper()
        .scrape_all(
            &[named_product("Heladera X200")],
            &[vendor("Naldo", &server), vendor("naldo", &server)],
            &CancelToken::none(),
        )
        .await;

    assert!(matches!(result, Err(ScrapeError::InvalidInput(_))));
}

// ---------------------------------------------------------------------------
// Fetcher: status errors and the 403 fallback transport
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_2xx_status_is_a_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/teapot"))
        .respond_with(ResponseTemplate::new(418))
        .mount(&server)
        .await;

    let client = PageClient::new(5, (0.0, 0.0), CancelToken::none(), None).unwrap();
    let log = ScrapeLog::new();
    let result = client
        .get(&log, &format!("{}/teapot", server.uri()), &[])
        .await;

    assert!(matches!(
        result,
        Err(ScrapeError::Status { status: 418, .. })
    ));
}

struct CannedTransport;

impl FallbackTransport for CannedTransport {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FetchedPage, ScrapeError>> {
        Box::pin(async move {
            Ok(FetchedPage {
                url: url.to_owned(),
                status: 200,
                body: b"impersonated body".to_vec(),
            })
        })
    }
}

#[tokio::test]
async fn forbidden_is_retried_once_through_the_fallback_transport() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = PageClient::new(
        5,
        (0.0, 0.0),
        CancelToken::none(),
        Some(Arc::new(CannedTransport)),
    )
    .unwrap();
    let log = ScrapeLog::new();
    let page = client
        .get(&log, &format!("{}/blocked", server.uri()), &[])
        .await
        .expect("fallback transport should rescue a 403");

    assert_eq!(page.text(), "impersonated body");
}

#[tokio::test]
async fn forbidden_without_fallback_propagates_the_original_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = PageClient::new(5, (0.0, 0.0), CancelToken::none(), None).unwrap();
    let log = ScrapeLog::new();
    let result = client
        .get(&log, &format!("{}/blocked", server.uri()), &[])
        .await;

    assert!(matches!(
        result,
        Err(ScrapeError::Status { status: 403, .. })
    ));
}

// ---------------------------------------------------------------------------
// Trace log surface
// ---------------------------------------------------------------------------

#[tokio::test]
async fn report_carries_the_run_trace_log() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/products/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&catalog_body(9_999.0)))
        .mount(&server)
        .await;

    let report = test_scraper()
        .scrape_all(
            &[named_product("Heladera X200")],
            &[vendor("TestVendor", &server)],
            &CancelToken::none(),
        )
        .await
        .unwrap();

    assert!(
        report.log.iter().any(|l| l.starts_with("GET ")),
        "log must trace outbound requests: {:?}",
        report.log
    );
    assert!(
        report.log.iter().any(|l| l.contains("strategy=structured-api")),
        "log must trace strategy attempts"
    );
}
