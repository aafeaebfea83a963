//! The shopper's cart: local mirror plus server reconciliation.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use tokio_util::sync::CancellationToken;
use tracing::instrument;

use marula_core::totals::{Totals, aggregate};
use marula_core::{LineItemId, ProductId};

use crate::api::CommerceBackend;
use crate::error::ApiError;
use crate::store::{StoreSnapshot, StoreStatus, upsert_by_product, with_cancellation};

/// Authoritative local mirror of the shopper's cart.
///
/// Shareable (`&self` operations, internal lock) so the checkout workflow
/// and the UI can hold the same store. The lock is never held across a
/// remote call.
pub struct CartStore<B> {
    backend: Arc<B>,
    state: RwLock<StoreSnapshot>,
}

impl<B: CommerceBackend> CartStore<B> {
    /// Create an empty cart store in the `Idle` state.
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: RwLock::new(StoreSnapshot::default()),
        }
    }

    /// A point-in-time copy of items, status, and totals for the UI.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current derived totals.
    #[must_use]
    pub fn totals(&self) -> Totals {
        self.snapshot().totals
    }

    /// Current load status.
    #[must_use]
    pub fn status(&self) -> StoreStatus {
        self.snapshot().status
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreSnapshot> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace local items wholesale with the server's list.
    ///
    /// On failure the previous item list is retained (stale-but-available
    /// reads) and the failure reason is recorded in the status.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`]; the store does not retry.
    #[instrument(skip(self, cancel))]
    pub async fn fetch_all(&self, cancel: &CancellationToken) -> Result<(), ApiError> {
        let previous_status = {
            let mut state = self.write();
            let previous = state.status.clone();
            state.status = StoreStatus::Loading;
            previous
        };

        match with_cancellation(cancel, self.backend.fetch_cart()).await {
            Ok(items) => {
                let mut state = self.write();
                state.items = items;
                state.totals = aggregate(&state.items);
                state.status = StoreStatus::Ready;
                Ok(())
            }
            Err(ApiError::Cancelled) => {
                self.write().status = previous_status;
                Err(ApiError::Cancelled)
            }
            Err(e) => {
                tracing::warn!(error = %e, "cart fetch failed, keeping stale items");
                self.write().status = StoreStatus::Error(e.reason());
                Err(e)
            }
        }
    }

    /// Add `quantity` units of a product.
    ///
    /// The server is authoritative for the merged quantity: when a line for
    /// this product already exists, the server's returned item replaces it
    /// wholesale; otherwise the returned item is appended.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for `quantity < 1` (checked before any
    /// remote call), or any remote failure.
    #[instrument(skip(self, cancel))]
    pub async fn add_item(
        &self,
        product_id: ProductId,
        quantity: u32,
        cancel: &CancellationToken,
    ) -> Result<(), ApiError> {
        if quantity < 1 {
            return Err(ApiError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }

        match with_cancellation(cancel, self.backend.add_cart_item(product_id, quantity)).await {
            Ok(item) => {
                let mut state = self.write();
                upsert_by_product(&mut state.items, item);
                state.totals = aggregate(&state.items);
                state.status = StoreStatus::Ready;
                Ok(())
            }
            Err(ApiError::Cancelled) => Err(ApiError::Cancelled),
            Err(e) => {
                self.write().status = StoreStatus::Error(e.reason());
                Err(e)
            }
        }
    }

    /// Change the quantity of an existing line.
    ///
    /// Rejected locally for `quantity < 1`; the caller must use
    /// [`remove_item`](Self::remove_item) instead. On success the server's
    /// returned line is merged in, keeping locally-known product detail the
    /// server response omitted. A server-side `NotFound` is surfaced as an
    /// error here, unlike removal.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for `quantity < 1`, or any remote failure.
    #[instrument(skip(self, cancel))]
    pub async fn update_quantity(
        &self,
        id: LineItemId,
        quantity: u32,
        cancel: &CancellationToken,
    ) -> Result<(), ApiError> {
        if quantity < 1 {
            return Err(ApiError::Validation(
                "quantity must be at least 1; remove the item instead".to_string(),
            ));
        }

        match with_cancellation(cancel, self.backend.update_cart_item(id, quantity)).await {
            Ok(server_item) => {
                let mut state = self.write();
                match state.items.iter_mut().find(|item| item.id == id) {
                    Some(local) => *local = local.merged_with(server_item),
                    None => upsert_by_product(&mut state.items, server_item),
                }
                state.totals = aggregate(&state.items);
                state.status = StoreStatus::Ready;
                Ok(())
            }
            Err(ApiError::Cancelled) => Err(ApiError::Cancelled),
            Err(e) => {
                self.write().status = StoreStatus::Error(e.reason());
                Err(e)
            }
        }
    }

    /// Remove a line by identity.
    ///
    /// A server-side `NotFound` still counts as success: the desired end
    /// state (item absent) already holds, so removal is idempotent.
    ///
    /// # Errors
    ///
    /// Any remote failure other than `NotFound`.
    #[instrument(skip(self, cancel))]
    pub async fn remove_item(
        &self,
        id: LineItemId,
        cancel: &CancellationToken,
    ) -> Result<(), ApiError> {
        match with_cancellation(cancel, self.backend.remove_cart_item(id)).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!(%id, "line item already absent server-side");
            }
            Err(ApiError::Cancelled) => return Err(ApiError::Cancelled),
            Err(e) => {
                self.write().status = StoreStatus::Error(e.reason());
                return Err(e);
            }
        }

        let mut state = self.write();
        state.items.retain(|item| item.id != id);
        state.totals = aggregate(&state.items);
        state.status = StoreStatus::Ready;
        Ok(())
    }

    /// Empty the cart.
    ///
    /// Local state is cleared unconditionally before the remote call:
    /// whatever the server says, local state must never contradict "the
    /// user asked to empty the cart". A benign "already empty" response is
    /// swallowed; a genuine transport or server error is surfaced, but the
    /// local clear stands.
    ///
    /// # Errors
    ///
    /// Any remote failure other than `NotFound`.
    #[instrument(skip(self, cancel))]
    pub async fn clear_all(&self, cancel: &CancellationToken) -> Result<(), ApiError> {
        {
            let mut state = self.write();
            state.items.clear();
            state.totals = Totals::default();
        }

        match with_cancellation(cancel, self.backend.clear_cart()).await {
            Ok(()) => {
                self.write().status = StoreStatus::Ready;
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                self.write().status = StoreStatus::Ready;
                Ok(())
            }
            Err(ApiError::Cancelled) => Err(ApiError::Cancelled),
            Err(e) => {
                self.write().status = StoreStatus::Error(e.reason());
                Err(e)
            }
        }
    }
}
