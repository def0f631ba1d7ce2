//! Normalization from [`RawProduct`] to [`katalog_core::NormalizedProduct`].
//!
//! Normalization never fails. Every anomaly in an upstream record (bad
//! price, undecodable category, missing text) degrades to a fixed default.

use std::sync::LazyLock;

use katalog_core::{NormalizedProduct, ProductId, MONITOR_CATEGORY};
use regex::Regex;
use scraper::Html;
use serde_json::Value;

use crate::types::RawProduct;

/// Price multiplier applied to [`MONITOR_CATEGORY`] products.
pub const MONITOR_MARKUP: f64 = 1.10;

/// Elements whose text content is never rendered.
const HIDDEN_ELEMENTS: [&str; 2] = ["script", "style"];

static TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)brzina").expect("valid terminology regex"));

/// Normalizes one upstream record.
#[must_use]
pub fn normalize_product(raw: RawProduct) -> NormalizedProduct {
    let category = raw
        .category
        .as_deref()
        .map(decode_category)
        .unwrap_or_default();

    let original_price = round_to_cents(parse_price(raw.price.as_ref()));
    let price = reprice(original_price, &category);

    NormalizedProduct {
        id: raw.id.and_then(product_id_from_value),
        name: raw.name.unwrap_or_default(),
        category,
        image: raw.image.unwrap_or_default(),
        original_price,
        price,
        description: raw
            .description
            .as_deref()
            .map(sanitize_description)
            .unwrap_or_default(),
    }
}

/// Resolves literal `\uXXXX` escape text in a category label.
///
/// The label is read as the body of a JSON string literal; anything that is
/// not a valid literal body comes back unchanged.
#[must_use]
pub fn decode_category(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_owned();
    }
    serde_json::from_str::<String>(&format!("\"{raw}\"")).unwrap_or_else(|_| raw.to_owned())
}

/// Coerces an upstream price to `f64`, `0.0` for anything unusable.
#[must_use]
pub fn parse_price(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|p| p.is_finite()).unwrap_or(0.0)
}

/// Rounds to 2 decimal places, half away from zero.
///
/// Ties on the exact binary value round up in magnitude (`0.125` gives
/// `0.13`), unlike banker's rounding which would give `0.12`.
#[must_use]
pub fn round_to_cents(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if !rounded.is_finite() {
        return value;
    }
    // Collapse -0.0 so it serializes as 0.0.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Applies the category pricing rule to an already-rounded price.
#[must_use]
pub fn reprice(original_price: f64, category: &str) -> f64 {
    if category == MONITOR_CATEGORY {
        round_to_cents(original_price * MONITOR_MARKUP)
    } else {
        original_price
    }
}

/// Reduces an HTML description to a single line of visible text.
///
/// The input is parsed as an HTML fragment. Text nodes are joined with a
/// space so adjacent blocks keep their word boundary; comments and the
/// contents of `script`/`style` are dropped and entities are decoded. A `<`
/// that does not open a tag stays in the text. Whitespace runs (including
/// CR/LF, tabs and NBSP) then collapse to one space and `brzina` is replaced
/// with `performanse` in any casing.
#[must_use]
pub fn sanitize_description(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    let visible: Vec<&str> = fragment
        .root_element()
        .descendants()
        .filter(|node| {
            !node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|el| el.name()))
                .is_some_and(|name| HIDDEN_ELEMENTS.contains(&name))
        })
        .filter_map(|node| node.value().as_text().map(|text| &**text))
        .collect();

    let single_line = visible.join(" ").split_whitespace().collect::<Vec<_>>().join(" ");
    TERM_RE.replace_all(&single_line, "performanse").into_owned()
}

fn product_id_from_value(value: Value) -> Option<ProductId> {
    match value {
        Value::Number(n) => Some(ProductId::Number(n)),
        Value::String(s) => Some(ProductId::Text(s)),
        Value::Bool(b) => Some(ProductId::Text(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
