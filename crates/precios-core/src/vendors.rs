//! Compiled-in default vendor table.
//!
//! These are the storefronts the engine is routinely run against; the
//! router's per-vendor strategy ordering keys off the same names.

use crate::model::Vendor;

const DEFAULT_VENDORS: &[(&str, &str)] = &[
    ("Carrefour", "https://www.carrefour.com.ar"),
    ("Cetrogar", "https://www.cetrogar.com.ar"),
    ("CheekSA", "https://cheeksa.com.ar"),
    ("Frávega", "https://www.fravega.com"),
    ("Libertad", "https://www.hiperlibertad.com.ar"),
    ("Masonline", "https://www.masonline.com.ar"),
    ("Megatone", "https://www.megatone.net"),
    ("Musimundo", "https://www.musimundo.com"),
    ("Naldo", "https://www.naldo.com.ar"),
    ("Vital", "https://www.vital.com.ar"),
];

/// The built-in vendor list, in display order.
#[must_use]
pub fn default_vendors() -> Vec<Vendor> {
    DEFAULT_VENDORS
        .iter()
        .map(|(name, url)| Vendor {
            name: (*name).to_owned(),
            base_url: (*url).to_owned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vendor_names_are_unique() {
        let vendors = default_vendors();
        let mut names: Vec<_> = vendors.iter().map(|v| v.name.to_lowercase()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), vendors.len());
    }

    #[test]
    fn default_vendor_urls_are_absolute() {
        assert!(default_vendors()
            .iter()
            .all(|v| v.base_url.starts_with("https://")));
    }
}
