//! HTTP front door.
//!
//! Three routes: `POST /api/scrape` runs the engine and returns the result
//! table, `GET /api/vendors` serves the compiled-in vendor list, and
//! `GET /healthz` answers liveness probes. A scrape that finds nothing is
//! a successful response full of `"ND"` cells; only structurally invalid
//! input or an internal failure produces an error status.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use precios_core::{default_vendors, AppConfig, Product, ScrapeOptions, Vendor};
use precios_scraper::{CancelToken, PriceScraper, ScrapeError};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
}

pub fn build_app(config: AppConfig) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/vendors", get(get_vendors))
        .route("/api/scrape", post(post_scrape))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { config })
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    data: T,
    meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
struct ResponseMeta {
    timestamp: DateTime<Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta {
                timestamp: Utc::now(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiError {
    code: &'static str,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "bad_request",
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "internal",
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.code {
            "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Serialize)]
struct VendorsData {
    vendors: Vec<Vendor>,
}

async fn get_vendors() -> impl IntoResponse {
    Json(ApiResponse::new(VendorsData {
        vendors: default_vendors(),
    }))
}

/// Vendors arrive either as a list of `{name, base_url}` records or as a
/// plain `{name: url}` object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VendorsInput {
    List(Vec<Vendor>),
    Map(serde_json::Map<String, serde_json::Value>),
}

impl VendorsInput {
    fn into_vendors(self) -> Vec<Vendor> {
        match self {
            Self::List(vendors) => vendors,
            Self::Map(map) => map
                .into_iter()
                .map(|(name, url)| Vendor {
                    name,
                    base_url: url.as_str().unwrap_or_default().to_owned(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScrapeRequest {
    products: Vec<Product>,
    vendors: Option<VendorsInput>,
    #[serde(flatten)]
    options: ScrapeOptions,
}

#[derive(Debug, Serialize)]
struct ScrapeData {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    logs: Option<Vec<String>>,
}

async fn post_scrape(
    State(state): State<AppState>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Json<ApiResponse<ScrapeData>>, ApiError> {
    let vendors = request
        .vendors
        .map_or_else(default_vendors, VendorsInput::into_vendors);
    let return_logs = request.options.return_logs;

    let scraper = PriceScraper::new(request.options)
        .with_request_timeout(state.config.request_timeout_secs);
    let report = scraper
        .scrape_all(&request.products, &vendors, &CancelToken::none())
        .await
        .map_err(|err| match err {
            ScrapeError::InvalidInput(source) => ApiError::bad_request(source.to_string()),
            other => ApiError::internal(other.to_string()),
        })?;

    let columns = report.table.headers();
    let rows = report
        .table
        .rows
        .iter()
        .map(|row| report.table.values(row))
        .collect();

    Ok(Json(ApiResponse::new(ScrapeData {
        columns,
        rows,
        logs: return_logs.then_some(report.log),
    })))
}
