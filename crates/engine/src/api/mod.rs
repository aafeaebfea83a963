//! Remote commerce backend: trait seam, wire DTOs, REST implementation.
//!
//! Stores and the checkout workflow are generic over [`CommerceBackend`] so
//! tests can substitute an in-memory fake. Production code uses
//! [`RestBackend`].

mod rest;

pub use rest::RestBackend;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use marula_core::pricing::effective_price;
use marula_core::{DeliveryOption, LineItem, LineItemId, Order, ProductId, ShopperProfile};

use crate::error::ApiError;

// =============================================================================
// Wire DTOs
// =============================================================================

/// Body for `POST /cart` and `POST /quotations`.
#[derive(Debug, Clone, Serialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body for `PUT /cart/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

/// Response of `GET /profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub profile_exists: bool,
    #[serde(default)]
    pub profile: Option<ShopperProfile>,
}

/// One line of an order submission.
///
/// Carries the resolved unit price plus the original list and promotional
/// prices so the server can audit what the shopper was shown.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    /// The effective unit price at checkout time.
    pub unit_price: Decimal,
    /// Original list price, for audit.
    pub list_price: Option<Decimal>,
    /// Original promotional price, for audit.
    pub buy_now_price: Option<Decimal>,
}

impl OrderItemRequest {
    /// Build the wire line for a display line item.
    #[must_use]
    pub fn from_line(item: &LineItem) -> Self {
        Self {
            product_id: item.product.id,
            quantity: item.quantity,
            unit_price: effective_price(&item.product),
            list_price: item.product.price,
            buy_now_price: item.product.buy_now_price,
        }
    }
}

/// Body for `POST /orders/checkout` and `POST /orders/direct`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub total_amount: Decimal,
    pub delivery_fee: Decimal,
    pub delivery_option: DeliveryOption,
}

// =============================================================================
// Backend trait
// =============================================================================

/// The remote commerce API, resource-oriented.
///
/// Implementations must not retry on their own; retry policy belongs to the
/// caller (and for order submission there is none).
#[async_trait]
pub trait CommerceBackend: Send + Sync {
    // Cart
    async fn fetch_cart(&self) -> Result<Vec<LineItem>, ApiError>;
    async fn add_cart_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<LineItem, ApiError>;
    async fn update_cart_item(&self, id: LineItemId, quantity: u32)
    -> Result<LineItem, ApiError>;
    async fn remove_cart_item(&self, id: LineItemId) -> Result<(), ApiError>;
    async fn clear_cart(&self) -> Result<(), ApiError>;

    // Quotations
    async fn fetch_quotations(&self) -> Result<Vec<LineItem>, ApiError>;
    async fn add_quotation(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<LineItem, ApiError>;
    async fn remove_quotation(&self, id: LineItemId) -> Result<(), ApiError>;
    async fn clear_quotations(&self) -> Result<(), ApiError>;

    // Profile
    async fn fetch_profile(&self) -> Result<ProfileResponse, ApiError>;

    // Orders
    async fn submit_cart_order(&self, order: &OrderRequest) -> Result<Order, ApiError>;
    async fn submit_direct_order(&self, order: &OrderRequest) -> Result<Order, ApiError>;
}
