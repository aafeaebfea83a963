//! Order and checkout value types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{OrderId, Product};

/// Delivery options offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOption {
    #[default]
    Standard,
    Express,
}

impl std::fmt::Display for DeliveryOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Express => write!(f, "express"),
        }
    }
}

/// A transient "buy now" selection that bypasses the cart for one checkout.
///
/// Never persisted; supplied out-of-band when the shopper buys a single
/// product directly from its page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectBuySelection {
    pub product: Product,
    pub quantity: u32,
}

/// The immutable amounts for a checkout, computed once when the checkout
/// is opened.
///
/// Subsequent cart mutations (another tab, a background sync) must not
/// change the amount being submitted, so this value is never recomputed
/// after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    /// Sum of effective unit price x quantity across all lines.
    pub items_total: Decimal,
    /// Flat fee for the chosen delivery option.
    pub delivery_fee: Decimal,
    /// `items_total + delivery_fee`.
    pub total: Decimal,
    /// Number of distinct lines (not unit quantity).
    pub item_count: u32,
    /// Total promotional savings across all lines.
    pub total_savings: Decimal,
}

/// A server-created order record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Server-issued human-facing order code.
    pub code: String,
    pub total_amount: Decimal,
    pub delivery_fee: Decimal,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
