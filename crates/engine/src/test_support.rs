//! In-memory [`CommerceBackend`] fake for store and checkout tests.
//!
//! Behaves like the real server where the contracts care: adds merge
//! quantities per product, removals of absent lines report `NotFound`, and
//! order submissions can be held open to exercise the double-submit guard.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Semaphore;

use marula_core::{
    LineItem, LineItemId, Order, OrderId, Product, ProductId, ShopperProfile,
};

use crate::api::{CommerceBackend, OrderRequest, ProfileResponse};
use crate::error::ApiError;

/// A failure scripted for the next backend call.
#[derive(Debug, Clone)]
pub enum ScriptedFailure {
    Server(u16, String),
    NotFound(String),
    AuthRequired,
}

impl ScriptedFailure {
    fn into_error(self) -> ApiError {
        match self {
            Self::Server(status, message) => ApiError::Server { status, message },
            Self::NotFound(message) => ApiError::NotFound(message),
            Self::AuthRequired => ApiError::AuthRequired,
        }
    }
}

#[derive(Default)]
struct FakeState {
    cart: Vec<LineItem>,
    quotations: Vec<LineItem>,
    catalog: HashMap<ProductId, Product>,
    profile: Option<ShopperProfile>,
    next_line_id: i64,
    sparse_updates: bool,
    fail_next: Option<ScriptedFailure>,
    calls: usize,
    cart_orders: usize,
    direct_orders: usize,
    last_order_request: Option<OrderRequest>,
}

/// Scriptable in-memory backend.
pub struct FakeBackend {
    state: Mutex<FakeState>,
    submission_gate: Mutex<Option<Arc<Semaphore>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_line_id: 1,
                ..FakeState::default()
            }),
            submission_gate: Mutex::new(None),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn seed_cart(&self, items: Vec<LineItem>) {
        let mut state = self.lock();
        state.next_line_id = items.iter().map(|i| i.id.as_i64()).max().unwrap_or(0) + 1;
        state.cart = items;
    }

    pub fn seed_quotations(&self, items: Vec<LineItem>) {
        let mut state = self.lock();
        state.next_line_id = state
            .next_line_id
            .max(items.iter().map(|i| i.id.as_i64()).max().unwrap_or(0) + 1);
        state.quotations = items;
    }

    pub fn seed_product(&self, product: Product) {
        self.lock().catalog.insert(product.id, product);
    }

    pub fn set_profile(&self, profile: Option<ShopperProfile>) {
        self.lock().profile = profile;
    }

    pub fn set_sparse_updates(&self, sparse: bool) {
        self.lock().sparse_updates = sparse;
    }

    pub fn fail_next(&self, failure: ScriptedFailure) {
        self.lock().fail_next = Some(failure);
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls
    }

    pub fn cart_items(&self) -> Vec<LineItem> {
        self.lock().cart.clone()
    }

    pub fn cart_orders_created(&self) -> usize {
        self.lock().cart_orders
    }

    pub fn direct_orders_created(&self) -> usize {
        self.lock().direct_orders
    }

    pub fn last_order_request(&self) -> Option<OrderRequest> {
        self.lock().last_order_request.clone()
    }

    /// Make subsequent order submissions block until released.
    pub fn hold_submissions(&self) {
        *self
            .submission_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(Semaphore::new(0)));
    }

    /// Release all held submissions.
    pub fn release_submissions(&self) {
        if let Some(gate) = self
            .submission_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            gate.add_permits(100);
        }
    }

    /// Record a call and pop any scripted failure.
    fn enter(&self) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.calls += 1;
        match state.fail_next.take() {
            Some(failure) => Err(failure.into_error()),
            None => Ok(()),
        }
    }

    fn add_line(state: &mut FakeState, list: ListKind, product_id: ProductId, quantity: u32) -> LineItem {
        let product = state
            .catalog
            .get(&product_id)
            .cloned()
            .unwrap_or_else(|| Product::with_price(product_id, Decimal::ZERO));

        let items = match list {
            ListKind::Cart => &mut state.cart,
            ListKind::Quotations => &mut state.quotations,
        };

        if let Some(existing) = items.iter_mut().find(|i| i.product.id == product_id) {
            existing.quantity += quantity;
            return existing.clone();
        }

        let item = LineItem::new(LineItemId::new(state.next_line_id), product, quantity);
        state.next_line_id += 1;
        match list {
            ListKind::Cart => state.cart.push(item.clone()),
            ListKind::Quotations => state.quotations.push(item.clone()),
        }
        item
    }

    fn remove_line(state: &mut FakeState, list: ListKind, id: LineItemId) -> Result<(), ApiError> {
        let items = match list {
            ListKind::Cart => &mut state.cart,
            ListKind::Quotations => &mut state.quotations,
        };
        let before = items.len();
        items.retain(|i| i.id != id);
        if items.len() == before {
            return Err(ApiError::NotFound(format!("line item {id} not found")));
        }
        Ok(())
    }

    async fn wait_for_gate(&self) {
        let gate = self
            .submission_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(gate) = gate {
            // Held open by the test; permits are added on release.
            let _permit = gate.acquire().await;
        }
    }

    fn order_for(state: &mut FakeState, request: &OrderRequest) -> Order {
        let n = state.cart_orders + state.direct_orders + 1;
        Order {
            id: OrderId::new(5000 + i64::try_from(n).unwrap_or(0)),
            code: format!("MRL-{n:04}"),
            total_amount: request.total_amount,
            delivery_fee: request.delivery_fee,
            created_at: None,
        }
    }
}

#[derive(Clone, Copy)]
enum ListKind {
    Cart,
    Quotations,
}

#[async_trait]
impl CommerceBackend for FakeBackend {
    async fn fetch_cart(&self) -> Result<Vec<LineItem>, ApiError> {
        self.enter()?;
        Ok(self.lock().cart.clone())
    }

    async fn add_cart_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<LineItem, ApiError> {
        self.enter()?;
        let mut state = self.lock();
        Ok(Self::add_line(&mut state, ListKind::Cart, product_id, quantity))
    }

    async fn update_cart_item(
        &self,
        id: LineItemId,
        quantity: u32,
    ) -> Result<LineItem, ApiError> {
        self.enter()?;
        let mut state = self.lock();
        let sparse = state.sparse_updates;
        let Some(item) = state.cart.iter_mut().find(|i| i.id == id) else {
            return Err(ApiError::NotFound(format!("line item {id} not found")));
        };
        item.quantity = quantity;
        if sparse {
            // Mimic servers that echo only identity and quantity.
            return Ok(LineItem::new(
                item.id,
                Product {
                    id: item.product.id,
                    name: String::new(),
                    price: None,
                    buy_now_price: None,
                    availability: 0,
                },
                item.quantity,
            ));
        }
        Ok(item.clone())
    }

    async fn remove_cart_item(&self, id: LineItemId) -> Result<(), ApiError> {
        self.enter()?;
        Self::remove_line(&mut self.lock(), ListKind::Cart, id)
    }

    async fn clear_cart(&self) -> Result<(), ApiError> {
        self.enter()?;
        self.lock().cart.clear();
        Ok(())
    }

    async fn fetch_quotations(&self) -> Result<Vec<LineItem>, ApiError> {
        self.enter()?;
        Ok(self.lock().quotations.clone())
    }

    async fn add_quotation(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<LineItem, ApiError> {
        self.enter()?;
        let mut state = self.lock();
        Ok(Self::add_line(
            &mut state,
            ListKind::Quotations,
            product_id,
            quantity,
        ))
    }

    async fn remove_quotation(&self, id: LineItemId) -> Result<(), ApiError> {
        self.enter()?;
        Self::remove_line(&mut self.lock(), ListKind::Quotations, id)
    }

    async fn clear_quotations(&self) -> Result<(), ApiError> {
        self.enter()?;
        self.lock().quotations.clear();
        Ok(())
    }

    async fn fetch_profile(&self) -> Result<ProfileResponse, ApiError> {
        self.enter()?;
        let state = self.lock();
        Ok(ProfileResponse {
            profile_exists: state.profile.is_some(),
            profile: state.profile.clone(),
        })
    }

    async fn submit_cart_order(&self, order: &OrderRequest) -> Result<Order, ApiError> {
        self.enter()?;
        self.lock().last_order_request = Some(order.clone());
        self.wait_for_gate().await;
        let mut state = self.lock();
        let created = Self::order_for(&mut state, order);
        state.cart_orders += 1;
        Ok(created)
    }

    async fn submit_direct_order(&self, order: &OrderRequest) -> Result<Order, ApiError> {
        self.enter()?;
        self.lock().last_order_request = Some(order.clone());
        self.wait_for_gate().await;
        let mut state = self.lock();
        let created = Self::order_for(&mut state, order);
        state.direct_orders += 1;
        Ok(created)
    }
}

// =============================================================================
// Fixture helpers
// =============================================================================

pub fn product(id: i64, price: Option<i64>, buy_now: Option<i64>) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("product-{id}"),
        price: price.map(Decimal::from),
        buy_now_price: buy_now.map(Decimal::from),
        availability: 10,
    }
}

pub fn line(id: i64, product: Product, quantity: u32) -> LineItem {
    LineItem::new(LineItemId::new(id), product, quantity)
}

pub fn complete_profile() -> ShopperProfile {
    ShopperProfile {
        full_name: "A. Shopper".to_string(),
        email: "shopper@example.com".to_string(),
        phone: "+27 82 000 0000".to_string(),
        address: "1 Orchard Lane".to_string(),
        city: "Cape Town".to_string(),
        postal_code: "8001".to_string(),
        country: "ZA".to_string(),
    }
}
