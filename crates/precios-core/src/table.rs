//! The tabular result returned to the front door.
//!
//! Column layout is fixed: `Producto`, `Marca`, then one pair of columns
//! per vendor (`<name>` display text, `<name> (num)` canonical amount),
//! then `Marca (Sitio oficial)` and `Fecha de Consulta`. Every vendor
//! column is present in every row even when nothing was found.

use serde::{Deserialize, Serialize};

use crate::model::{PriceFinding, Product, NOT_DETERMINED};

/// The resolved price pair for one vendor on one row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorCell {
    pub vendor: String,
    /// Display text, or `"ND"` when no verified price was found.
    pub display: String,
    /// Canonical integer amount as a digit string, or `""` alongside `"ND"`.
    pub amount: String,
}

impl VendorCell {
    #[must_use]
    pub fn from_finding(vendor: &str, finding: Option<PriceFinding>) -> Self {
        match finding {
            Some(f) => Self {
                vendor: vendor.to_owned(),
                display: f.display_text,
                amount: f.canonical_amount,
            },
            None => Self {
                vendor: vendor.to_owned(),
                display: NOT_DETERMINED.to_owned(),
                amount: String::new(),
            },
        }
    }
}

/// One result row: the product's fixed columns plus a cell per vendor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRow {
    pub producto: String,
    pub marca: String,
    /// Reserved official-site column; always `"ND"` in this engine.
    pub marca_sitio_oficial: String,
    /// Query date, `DD/MM/YYYY`.
    pub fecha_consulta: String,
    pub cells: Vec<VendorCell>,
}

impl ResultRow {
    #[must_use]
    pub fn new(product: &Product, query_date: String) -> Self {
        Self {
            producto: product.name.clone().unwrap_or_default(),
            marca: product.brand.clone().unwrap_or_default(),
            marca_sitio_oficial: NOT_DETERMINED.to_owned(),
            fecha_consulta: query_date,
            cells: Vec::new(),
        }
    }
}

/// The full result table for one scrape run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultTable {
    /// Vendor names in column order.
    pub vendors: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    #[must_use]
    pub fn new(vendors: Vec<String>) -> Self {
        Self {
            vendors,
            rows: Vec::new(),
        }
    }

    /// Column headers in output order.
    #[must_use]
    pub fn headers(&self) -> Vec<String> {
        let mut cols = vec!["Producto".to_owned(), "Marca".to_owned()];
        for vendor in &self.vendors {
            cols.push(vendor.clone());
            cols.push(format!("{vendor} (num)"));
        }
        cols.push("Marca (Sitio oficial)".to_owned());
        cols.push("Fecha de Consulta".to_owned());
        cols
    }

    /// Flattens one row into cell values matching [`Self::headers`] order.
    ///
    /// Cells are emitted in table vendor order, not in the row's internal
    /// order, so rows stay aligned even if a caller reordered them.
    #[must_use]
    pub fn values(&self, row: &ResultRow) -> Vec<String> {
        let mut out = vec![row.producto.clone(), row.marca.clone()];
        for vendor in &self.vendors {
            let cell = row.cells.iter().find(|c| &c.vendor == vendor);
            match cell {
                Some(c) => {
                    out.push(c.display.clone());
                    out.push(c.amount.clone());
                }
                None => {
                    out.push(NOT_DETERMINED.to_owned());
                    out.push(String::new());
                }
            }
        }
        out.push(row.marca_sitio_oficial.clone());
        out.push(row.fecha_consulta.clone());
        out
    }
}
