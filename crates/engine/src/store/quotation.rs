//! The shopper's quotation (save-for-later / RFQ) list.
//!
//! Structural sibling of [`CartStore`](crate::store::CartStore) with an
//! independent lifecycle and the same failure contracts. The remote API
//! offers no quantity update for quotations; re-adding a product replaces
//! its line via the server merge.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use tokio_util::sync::CancellationToken;
use tracing::instrument;

use marula_core::totals::{Totals, aggregate};
use marula_core::{LineItemId, ProductId};

use crate::api::CommerceBackend;
use crate::error::ApiError;
use crate::store::{StoreSnapshot, StoreStatus, upsert_by_product, with_cancellation};

/// Authoritative local mirror of the shopper's quotation list.
pub struct QuotationStore<B> {
    backend: Arc<B>,
    state: RwLock<StoreSnapshot>,
}

impl<B: CommerceBackend> QuotationStore<B> {
    /// Create an empty quotation store in the `Idle` state.
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
    /// # Errors
    ///
    /// Any [`ApiError`]; stale items remain readable on failure.
    #[instrument(skip(self, cancel))]
    pub async fn fetch_all(&self, cancel: &CancellationToken) -> Result<(), ApiError> {
        let previous_status = {
            let mut state = self.write();
            let previous = state.status.clone();
            state.status = StoreStatus::Loading;
            previous
        };

        match with_cancellation(cancel, self.backend.fetch_quotations()).await {
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
                tracing::warn!(error = %e, "quotation fetch failed, keeping stale items");
                self.write().status = StoreStatus::Error(e.reason());
                Err(e)
            }
        }
    }

    /// Add `quantity` units of a product to the quotation list.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for `quantity < 1`, or any remote failure.
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

        match with_cancellation(cancel, self.backend.add_quotation(product_id, quantity)).await {
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

    /// Remove a quotation line by identity. Idempotent, like cart removal.
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
        match with_cancellation(cancel, self.backend.remove_quotation(id)).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!(%id, "quotation already absent server-side");
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

    /// Empty the quotation list. Local state clears unconditionally.
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

        match with_cancellation(cancel, self.backend.clear_quotations()).await {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeBackend, ScriptedFailure, line, product};
    use rust_decimal::Decimal;

    fn token() -> CancellationToken {
        CancellationToken::new()
    }

    #[tokio::test]
    async fn test_quotation_lifecycle_is_independent_of_cart() {
        let backend = Arc::new(FakeBackend::new());
        backend.seed_cart(vec![line(1, product(10, Some(1000), None), 1)]);
        backend.seed_quotations(vec![line(50, product(30, Some(700), Some(650)), 2)]);

        let quotations = QuotationStore::new(Arc::clone(&backend));
        quotations.fetch_all(&token()).await.expect("fetch");

        let snapshot = quotations.snapshot();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.totals.total_price, Decimal::from(1300));
        assert_eq!(snapshot.totals.total_savings, Decimal::from(100));

        quotations.clear_all(&token()).await.expect("clear");
        assert!(quotations.snapshot().items.is_empty());
        assert_eq!(
            backend.cart_items().len(),
            1,
            "clearing quotations leaves the cart alone"
        );
    }

    #[tokio::test]
    async fn test_add_validates_quantity_locally() {
        let backend = Arc::new(FakeBackend::new());
        let quotations = QuotationStore::new(Arc::clone(&backend));

        let err = quotations
            .add_item(ProductId::new(30), 0, &token())
            .await
            .expect_err("validation");
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_re_adding_a_product_replaces_its_line() {
        let backend = Arc::new(FakeBackend::new());
        backend.seed_product(product(30, Some(700), None));
        let quotations = QuotationStore::new(Arc::clone(&backend));

        quotations
            .add_item(ProductId::new(30), 1, &token())
            .await
            .expect("first add");
        quotations
            .add_item(ProductId::new(30), 2, &token())
            .await
            .expect("second add");

        let snapshot = quotations.snapshot();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items.first().map(|i| i.quantity), Some(3));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let backend = Arc::new(FakeBackend::new());
        backend.seed_quotations(vec![line(50, product(30, Some(700), None), 1)]);
        let quotations = QuotationStore::new(Arc::clone(&backend));
        quotations.fetch_all(&token()).await.expect("fetch");

        quotations
            .remove_item(LineItemId::new(50), &token())
            .await
            .expect("first remove");
        quotations
            .remove_item(LineItemId::new(50), &token())
            .await
            .expect("second remove is benign");
        assert!(quotations.snapshot().items.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_stale_items() {
        let backend = Arc::new(FakeBackend::new());
        backend.seed_quotations(vec![line(50, product(30, Some(700), None), 1)]);
        let quotations = QuotationStore::new(Arc::clone(&backend));
        quotations.fetch_all(&token()).await.expect("first fetch");

        backend.fail_next(ScriptedFailure::Server(502, "upstream".to_string()));
        quotations.fetch_all(&token()).await.expect_err("fails");

        let snapshot = quotations.snapshot();
        assert_eq!(snapshot.items.len(), 1);
        assert!(matches!(snapshot.status, StoreStatus::Error(_)));
    }
}
