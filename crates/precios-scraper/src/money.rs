//! Monetary text normalization.
//!
//! Storefronts localize prices three different ways: `1.234,56`
//! (dot-thousands), `1,234.56` (comma-thousands), and single-separator
//! forms that could be either. [`parse_amount`] resolves those into a
//! canonical integer amount: a plain digit string with no separators, no
//! decimals, never signed. [`format_display`] goes the other way, always
//! rendering dot-thousands with a forced `,00` tail.

use regex::Regex;

/// The generic monetary pattern used for card-local and page-wide matches:
/// an optional `$`, then a digit followed by any run of digits/separators.
pub(crate) fn price_pattern() -> Regex {
    Regex::new(r"\$?\s*\d[\d.,]*").expect("valid regex")
}

/// Interprets a freeform price text and returns the canonical integer
/// amount as a digit string.
///
/// Disambiguation:
/// - both `,` and `.` present: the right-most one is the decimal point,
///   the other is thousands grouping;
/// - only `,`: decimal when at most 2 digits follow the last one,
///   thousands grouping otherwise;
/// - only `.`: thousands grouping when the total digit count is ≥ 5.
///
/// Decimals are truncated. When numeric parsing still fails, falls back to
/// the raw digits of the input; `None` only when no digit exists at all.
#[must_use]
pub fn parse_amount(text: &str) -> Option<String> {
    let raw = text.trim();
    if raw.is_empty() {
        return None;
    }

    let norm: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if norm.is_empty() {
        return None;
    }

    let has_comma = norm.contains(',');
    let has_dot = norm.contains('.');

    let normalized = if has_comma && has_dot {
        let last_comma = norm.rfind(',').expect("comma present");
        let last_dot = norm.rfind('.').expect("dot present");
        if last_comma > last_dot {
            norm.replace('.', "").replace(',', ".")
        } else {
            norm.replace(',', "")
        }
    } else if has_comma {
        let tail = norm.rsplit(',').next().unwrap_or("");
        if tail.len() <= 2 {
            norm.replace(',', ".")
        } else {
            norm.replace(',', "")
        }
    } else if has_dot && norm.chars().filter(char::is_ascii_digit).count() >= 5 {
        norm.replace('.', "")
    } else {
        norm
    };

    match normalized.parse::<f64>() {
        Ok(value) if value >= 0.0 => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let truncated = value.trunc() as u64;
            Some(truncated.to_string())
        }
        _ => {
            let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
            if digits.is_empty() {
                None
            } else {
                Some(digits)
            }
        }
    }
}

/// Canonical amount from an already-numeric price (JSON number fields).
/// Negative or non-finite values are rejected.
#[must_use]
pub fn amount_from_float(value: f64) -> Option<String> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let truncated = value.trunc() as u64;
    Some(truncated.to_string())
}

/// Renders a canonical amount as display text: `"123456"` → `"$ 123.456,00"`
/// (dot-thousands, forced two-decimal comma tail). Formatting failure
/// yields an empty string, which callers treat as "no finding".
#[must_use]
pub fn format_display(canonical_amount: &str) -> String {
    let Ok(value) = canonical_amount.parse::<u64>() else {
        return String::new();
    };
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("$ {grouped},00")
}
