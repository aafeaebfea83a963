//! Product catalog types.
//!
//! Prices arrive from the remote store as JSON numbers or decimal strings,
//! and historical records sometimes carry malformed values. Price fields
//! therefore deserialize leniently: anything that is not a parseable number
//! becomes `None` rather than a deserialization error, and the pricing
//! layer degrades it to zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// A product as known to the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Server-assigned product ID.
    pub id: ProductId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// List price. `None` when missing or malformed upstream.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price: Option<Decimal>,
    /// Promotional "buy now" price override, when a promotion is active.
    ///
    /// No upstream invariant guarantees this is below `price`; the pricing
    /// layer handles either ordering.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub buy_now_price: Option<Decimal>,
    /// Informational stock count. Not authoritative for fulfillment.
    #[serde(default)]
    pub availability: i64,
}

impl Product {
    /// Create a product with just an ID and list price, for call sites that
    /// only care about pricing.
    #[must_use]
    pub fn with_price(id: ProductId, price: Decimal) -> Self {
        Self {
            id,
            name: String::new(),
            price: Some(price),
            buy_now_price: None,
            availability: 0,
        }
    }
}

/// Deserialize a price field from a JSON number, a numeric string, or
/// anything else (which maps to `None`).
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
        serde_json::Value::String(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    })
}
