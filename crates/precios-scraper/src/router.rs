//! Per-vendor strategy ordering.
//!
//! The one place vendor-specific tuning lives: a static lookup from vendor
//! name to an ordered strategy chain, encoding which platform family each
//! vendor is known to run. Unknown vendors get the default order.

use crate::strategies::StrategyKind::{
    self, Brochure, GenericHtml, StorefrontJson, StructuredApi, TemplateHtml,
};

const DEFAULT_ORDER: &[StrategyKind] =
    &[StructuredApi, TemplateHtml, StorefrontJson, GenericHtml];

/// The strategy chain for a vendor, most promising platform first.
#[must_use]
pub fn strategy_order(vendor_name: &str) -> &'static [StrategyKind] {
    match vendor_name.trim().to_lowercase().as_str() {
        // Storefront-JSON platforms that also publish price brochures.
        "cheeksa" | "megatone" => &[
            StorefrontJson,
            Brochure,
            StructuredApi,
            TemplateHtml,
            GenericHtml,
        ],
        // Prices live almost exclusively in the weekly brochure.
        "vital" => &[
            Brochure,
            StorefrontJson,
            StructuredApi,
            TemplateHtml,
            GenericHtml,
        ],
        "musimundo" => &[StructuredApi, TemplateHtml, StorefrontJson, GenericHtml],
        _ => DEFAULT_ORDER,
    }
}
