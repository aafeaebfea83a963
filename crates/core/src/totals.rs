//! Folding line items into cart totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::{effective_price, savings};
use crate::types::LineItem;

/// Derived totals for a cart or quotation list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Total unit quantity across all lines.
    pub total_items: u32,
    /// Sum of effective unit price x quantity.
    pub total_price: Decimal,
    /// Sum of promotional savings.
    pub total_savings: Decimal,
}

/// Fold a collection of line items into [`Totals`].
///
/// Pure summation, so the result is invariant under reordering and a
/// single-line delta applied to a previous total equals full recomputation.
/// Stores recompute from scratch after every mutation and rely on this.
#[must_use]
pub fn aggregate(items: &[LineItem]) -> Totals {
    items.iter().fold(Totals::default(), |mut acc, item| {
        acc.total_items += item.quantity;
        acc.total_price += effective_price(&item.product) * Decimal::from(item.quantity);
        acc.total_savings += savings(&item.product, item.quantity);
        acc
    })
}
