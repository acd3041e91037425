pub mod config;
mod model;
mod table;
mod vendors;

pub use config::{load_app_config, load_app_config_from_env, AppConfig, ConfigError};
pub use model::{PriceFinding, Product, ScrapeOptions, Vendor, NOT_DETERMINED};
pub use table::{ResultRow, ResultTable, VendorCell};
pub use vendors::default_vendors;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("empty product list")]
    NoProducts,

    #[error("empty vendor list")]
    NoVendors,

    #[error("duplicate vendor name: {0}")]
    DuplicateVendor(String),

    #[error("vendor \"{name}\" has no base URL")]
    MissingBaseUrl { name: String },
}

/// Validates the (products, vendors) input pair before a scrape run.
///
/// # Errors
///
/// Returns [`CoreError`] when either list is empty, a vendor name repeats
/// (names key the output columns, so they must be unique), or a vendor has
/// a blank base URL.
pub fn validate_input(products: &[Product], vendors: &[Vendor]) -> Result<(), CoreError> {
    if products.is_empty() {
        return Err(CoreError::NoProducts);
    }
    if vendors.is_empty() {
        return Err(CoreError::NoVendors);
    }
    let mut seen = std::collections::HashSet::new();
    for vendor in vendors {
        if !seen.insert(vendor.name.to_lowercase()) {
            return Err(CoreError::DuplicateVendor(vendor.name.clone()));
        }
        if vendor.base_url.trim().is_empty() {
            return Err(CoreError::MissingBaseUrl {
                name: vendor.name.clone(),
            });
        }
    }
    Ok(())
}
