use std::fmt;

use serde::{Deserialize, Serialize};

/// Upstream product identifier, kept in whichever JSON shape upstream sent.
///
/// Upstream typing is unreliable (the same catalog has been observed sending
/// both `7` and `"7"`), so identifiers are compared through their textual
/// form rather than by variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Number(n) => write!(f, "{n}"),
            ProductId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        ProductId::Number(value.into())
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        ProductId::Text(value.to_owned())
    }
}

/// A catalog product in canonical shape, ready to filter and serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedProduct {
    /// `None` serializes as `null` when upstream omitted the identifier.
    pub id: Option<ProductId>,
    pub name: String,
    /// Decoded category label; empty when upstream had none.
    pub category: String,
    pub image: String,
    /// Upstream price rounded to 2 decimals, `0.0` when missing or unparsable.
    pub original_price: f64,
    /// Selling price after category repricing, rounded to 2 decimals.
    pub price: f64,
    /// Plain-text description with markup and whitespace noise removed.
    pub description: String,
}

impl NormalizedProduct {
    /// Textual form of the identifier, if one is present.
    #[must_use]
    pub fn id_text(&self) -> Option<String> {
        self.id.as_ref().map(ToString::to_string)
    }
}

/// Finds the first product whose identifier renders as `id`.
#[must_use]
pub fn find_by_id<'a>(products: &'a [NormalizedProduct], id: &str) -> Option<&'a NormalizedProduct> {
    products
        .iter()
        .find(|p| p.id.as_ref().is_some_and(|pid| pid.to_string() == id))
}
