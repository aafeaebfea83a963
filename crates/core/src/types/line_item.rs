//! Cart and quotation line items.

use serde::{Deserialize, Serialize};

use crate::types::{LineItemId, Product};

/// A single line in a cart or quotation list.
///
/// Created by an add operation, mutated in place by a quantity update, and
/// destroyed by a remove or bulk clear. The ID is server-assigned; a line
/// item that has not round-tripped through the server does not exist in
/// store state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Server-assigned line item ID, unique within its list.
    pub id: LineItemId,
    /// The product this line references, with pricing snapshot.
    pub product: Product,
    /// Quantity, always >= 1. Enforced at the store operation boundary.
    pub quantity: u32,
}

impl LineItem {
    /// Create a line item.
    #[must_use]
    pub const fn new(id: LineItemId, product: Product, quantity: u32) -> Self {
        Self {
            id,
            product,
            quantity,
        }
    }

    /// Merge a server-returned line into this one, keeping locally-known
    /// product detail the server response omitted.
    ///
    /// The server is authoritative for identity and quantity. Product name
    /// and prices are backfilled from the local copy when the server sent
    /// them back empty, which happens on sparse update responses.
    #[must_use]
    pub fn merged_with(&self, server: Self) -> Self {
        let mut product = server.product;
        if product.name.is_empty() && !self.product.name.is_empty() {
            product.name.clone_from(&self.product.name);
        }
        if product.price.is_none() {
            product.price = self.product.price;
        }
        if product.buy_now_price.is_none() {
            product.buy_now_price = self.product.buy_now_price;
        }
        Self {
            id: server.id,
            product,
            quantity: server.quantity,
        }
    }
}
