//! Wire types for the upstream catalog API.
//!
//! ## Observed product shape
//!
//! The products endpoint returns a bare JSON array. Field names are Serbian
//! and loosely typed:
//!
//! - `sif_product`: the identifier, sometimes a number and sometimes a string.
//! - `naziv`: display name.
//! - `categoryName`: category label. Some records carry literal escape text
//!   such as `"Slu\\u0161alice"` instead of the real characters.
//! - `imgsrc`: image URL.
//! - `price`: a number, a numeric string, `null`, or missing.
//! - `description`: HTML fragment with stray line breaks and tabs.
//!
//! Every field may be absent or `null`. Text fields that arrive as numbers
//! or booleans are rendered to text rather than failing the whole list.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One product record as upstream sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProduct {
    #[serde(default, rename = "sif_product")]
    pub id: Option<Value>,

    #[serde(default, rename = "naziv", deserialize_with = "lenient_text")]
    pub name: Option<String>,

    #[serde(default, rename = "categoryName", deserialize_with = "lenient_text")]
    pub category: Option<String>,

    #[serde(default, rename = "imgsrc", deserialize_with = "lenient_text")]
    pub image: Option<String>,

    /// Kept raw; coerced to a number during normalization.
    #[serde(default)]
    pub price: Option<Value>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
}

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST /login`. A missing or empty `token` means rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default, deserialize_with = "lenient_text")]
    pub token: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(Value::Null | Value::Array(_) | Value::Object(_)) | None => None,
    })
}
