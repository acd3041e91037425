//! Search-term generation and text matching.
//!
//! Terms are ordered most-specific-first (identifier code, brand+model,
//! model, bare name, brand+capacity) because a specific term keeps the
//! card verifier's token-subset rule from latching onto the wrong card.
//! Symbol-stripped and slash/quote-neutralized secondaries are appended
//! for each candidate since those characters break phrase matching
//! against page text.

use precios_core::Product;
use regex::Regex;

/// Hard cap on the generated variant list.
const MAX_VARIANTS: usize = 10;

pub(crate) fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps letters (including Spanish accented ones), digits, space, hyphen,
/// underscore, slash and dot; everything else becomes a space.
fn strip_symbols(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric()
                || c == ' '
                || c == '-'
                || c == '_'
                || c == '/'
                || c == '.'
                || "ÁÉÍÓÚÜÑáéíóúüñ".contains(c)
            {
                c
            } else {
                ' '
            }
        })
        .collect();
    normalize_spaces(&cleaned)
}

/// Replaces slashes and quotes with spaces; sizes like `8"` or `220/240`
/// otherwise never match a card's text rendering.
fn neutralize_slashes_and_quotes(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| match c {
            '/' | '\\' | '"' | '\'' | '“' | '”' => ' ',
            other => other,
        })
        .collect();
    normalize_spaces(&cleaned)
}

fn push_unique(out: &mut Vec<String>, candidate: String) {
    if candidate.is_empty() || out.len() >= MAX_VARIANTS {
        return;
    }
    let lower = candidate.to_lowercase();
    if out.iter().any(|existing| existing.to_lowercase() == lower) {
        return;
    }
    out.push(candidate);
}

/// Ordered search-term variants for a product: most specific first,
/// case-insensitively deduplicated, capped at 10.
#[must_use]
pub fn variants(product: &Product) -> Vec<String> {
    let get = |field: &Option<String>| {
        field
            .as_deref()
            .map(normalize_spaces)
            .filter(|s| !s.is_empty())
    };

    let brand = get(&product.brand);
    let model = get(&product.model);
    let name = get(&product.name);
    let capacity = get(&product.capacity);
    let code = get(&product.identifier_code);

    let mut candidates = Vec::new();
    if let Some(code) = code {
        candidates.push(code);
    }
    if let (Some(brand), Some(model)) = (&brand, &model) {
        candidates.push(format!("{brand} {model}"));
    }
    if let Some(model) = &model {
        candidates.push(model.clone());
    }
    if let Some(name) = name {
        candidates.push(name);
    }
    if let (Some(brand), Some(capacity)) = (&brand, &capacity) {
        candidates.push(format!("{brand} {capacity}"));
    }

    let mut out = Vec::new();
    for candidate in candidates {
        let stripped = strip_symbols(&candidate);
        let neutral = neutralize_slashes_and_quotes(&candidate);
        push_unique(&mut out, candidate);
        push_unique(&mut out, stripped);
        push_unique(&mut out, neutral);
    }
    out
}

/// Comparison variants for one search term: the term itself plus its
/// symbol-stripped and slash/quote-neutralized forms when they differ.
#[must_use]
pub fn match_variants(term: &str) -> Vec<String> {
    let base = normalize_spaces(term);
    let mut out = Vec::new();
    let stripped = strip_symbols(&base);
    let neutral = neutralize_slashes_and_quotes(&base);
    push_unique(&mut out, base);
    push_unique(&mut out, stripped);
    push_unique(&mut out, neutral);
    out
}

/// Token-subset rule: `text` mentions a variant when every
/// whitespace-split token of that variant appears as a substring of the
/// text, case-insensitively.
#[must_use]
pub fn text_mentions_any(text: &str, variants: &[String]) -> bool {
    let haystack = normalize_spaces(text).to_lowercase();
    variants.iter().any(|variant| {
        let v = normalize_spaces(variant).to_lowercase();
        !v.is_empty() && v.split_whitespace().all(|token| haystack.contains(token))
    })
}

/// Finds a `https://...pdf` URL inside arbitrary text (used for share-link
/// payloads).
pub(crate) fn embedded_pdf_url(text: &str) -> Option<String> {
    let re = Regex::new(r"https?://\S+?\.pdf").expect("valid regex");
    re.find(text).map(|m| m.as_str().to_owned())
}
