//! The checkout workflow.
//!
//! State machine: `LoadingProfile -> (NeedsProfile | Ready) -> Processing
//! -> (Submitted | Failed)`. `Failed` is re-enterable; `Submitted` is the
//! end of the flow.
//!
//! Creating an order is the engine's only remote write with externally
//! visible, non-idempotent side effects, so submission carries the
//! strictest guard: a compare-and-swap flag rejects a second `submit()`
//! while one is in flight, and there is no automatic retry - a retry is
//! always a new, explicit `submit()` after a failure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use marula_core::totals::aggregate;
use marula_core::{
    DeliveryOption, DirectBuySelection, LineItem, LineItemId, Order, OrderSummary, ShopperProfile,
};

use crate::api::{CommerceBackend, OrderItemRequest, OrderRequest};
use crate::config::DeliveryFees;
use crate::error::ApiError;
use crate::store::{CartStore, StoreStatus, with_cancellation};

/// Where the checkout flow currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutPhase {
    /// Fetching the shopper profile.
    LoadingProfile,
    /// The profile is absent or incomplete; checkout halts until the
    /// profile-completion collaborator reports success.
    NeedsProfile { missing: Vec<&'static str> },
    /// Summary computed; waiting for `submit()`.
    Ready,
    /// An order submission is in flight.
    Processing,
    /// The order was created server-side.
    Submitted,
    /// The last submission failed; `submit()` may be called again.
    Failed(String),
}

/// Everything the confirmation collaborator needs after a successful
/// submission.
#[derive(Debug, Clone)]
pub struct Confirmation {
    /// The server-created order.
    pub order: Order,
    /// The summary that was actually submitted.
    pub summary: OrderSummary,
    /// Display line items for the confirmation screen.
    pub items: Vec<LineItem>,
}

/// Checkout-specific failures.
///
/// An incomplete profile is not an error - it is the `NeedsProfile` phase.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// `submit()` was called before the flow reached `Ready`.
    #[error("checkout is not ready to submit")]
    NotReady,

    /// A submission is already in flight; no second order was issued.
    #[error("an order submission is already in progress")]
    SubmissionInProgress,

    /// There is nothing to check out.
    #[error("cart is empty")]
    EmptyOrder,

    /// A remote or validation failure, see [`ApiError`].
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// What the checkout draws its line items from.
enum Mode<B> {
    /// Order the current cart contents; clears the cart on success.
    Cart(Arc<CartStore<B>>),
    /// Order a single "buy now" selection; never touches the cart.
    Direct(DirectBuySelection),
}

struct CheckoutState {
    phase: CheckoutPhase,
    items: Vec<LineItem>,
    summary: Option<OrderSummary>,
}

/// Orchestrates one checkout from profile validation to order submission.
///
/// Shareable (`&self` operations); the submission guard makes `submit()`
/// safe against double invocation from impatient double-clicks or
/// concurrent tasks.
pub struct CheckoutOrchestrator<B> {
    backend: Arc<B>,
    mode: Mode<B>,
    delivery: DeliveryOption,
    fees: DeliveryFees,
    state: RwLock<CheckoutState>,
    processing: AtomicBool,
}

impl<B: CommerceBackend> CheckoutOrchestrator<B> {
    /// Checkout of the current cart contents.
    #[must_use]
    pub fn for_cart(
        backend: Arc<B>,
        cart: Arc<CartStore<B>>,
        fees: DeliveryFees,
        delivery: DeliveryOption,
    ) -> Self {
        Self::new(backend, Mode::Cart(cart), fees, delivery)
    }

    /// Direct "buy now" checkout of a single selection, bypassing the cart.
    #[must_use]
    pub fn for_direct(
        backend: Arc<B>,
        selection: DirectBuySelection,
        fees: DeliveryFees,
        delivery: DeliveryOption,
    ) -> Self {
        Self::new(backend, Mode::Direct(selection), fees, delivery)
    }

    fn new(backend: Arc<B>, mode: Mode<B>, fees: DeliveryFees, delivery: DeliveryOption) -> Self {
        Self {
            backend,
            mode,
            delivery,
            fees,
            state: RwLock::new(CheckoutState {
                phase: CheckoutPhase::LoadingProfile,
                items: Vec::new(),
                summary: None,
            }),
            processing: AtomicBool::new(false),
        }
    }

    /// The current phase.
    #[must_use]
    pub fn phase(&self) -> CheckoutPhase {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .phase
            .clone()
    }

    /// The immutable summary, once the flow has reached `Ready`.
    #[must_use]
    pub fn summary(&self) -> Option<OrderSummary> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .summary
            .clone()
    }

    fn write(&self) -> RwLockWriteGuard<'_, CheckoutState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate the profile and compute the immutable [`OrderSummary`].
    ///
    /// In cart mode this first ensures the cart store holds current items.
    /// The summary is computed exactly once here: cart mutations after
    /// `begin()` (say, from another tab) cannot change the amount that
    /// `submit()` will send.
    ///
    /// # Errors
    ///
    /// Remote failures and the empty-cart case. An incomplete profile is
    /// reported as `Ok(CheckoutPhase::NeedsProfile { .. })`, not an error.
    #[instrument(skip(self, cancel))]
    pub async fn begin(&self, cancel: &CancellationToken) -> Result<CheckoutPhase, CheckoutError> {
        self.write().phase = CheckoutPhase::LoadingProfile;

        let response = match with_cancellation(cancel, self.backend.fetch_profile()).await {
            Ok(response) => response,
            Err(ApiError::Cancelled) => return Err(ApiError::Cancelled.into()),
            Err(e) => {
                self.write().phase = CheckoutPhase::Failed(e.reason());
                return Err(e.into());
            }
        };

        let complete = response.profile_exists
            && response
                .profile
                .as_ref()
                .is_some_and(ShopperProfile::is_complete);
        if !complete {
            let missing = response.profile.as_ref().map_or_else(
                || vec!["phone", "address", "city", "postal_code", "country"],
                ShopperProfile::missing_fields,
            );
            let phase = CheckoutPhase::NeedsProfile { missing };
            self.write().phase = phase.clone();
            return Ok(phase);
        }

        let items = match &self.mode {
            Mode::Direct(selection) => {
                if selection.quantity < 1 {
                    return Err(ApiError::Validation(
                        "quantity must be at least 1".to_string(),
                    )
                    .into());
                }
                // Transient display line; never persisted, id 0 by convention.
                vec![LineItem::new(
                    LineItemId::new(0),
                    selection.product.clone(),
                    selection.quantity,
                )]
            }
            Mode::Cart(cart) => {
                if cart.status() != StoreStatus::Ready
                    && let Err(e) = cart.fetch_all(cancel).await
                {
                    if !matches!(e, ApiError::Cancelled) {
                        self.write().phase = CheckoutPhase::Failed(e.reason());
                    }
                    return Err(e.into());
                }
                cart.snapshot().items
            }
        };

        if items.is_empty() {
            self.write().phase = CheckoutPhase::Failed(CheckoutError::EmptyOrder.to_string());
            return Err(CheckoutError::EmptyOrder);
        }

        let totals = aggregate(&items);
        let delivery_fee = self.fees.fee_for(self.delivery);
        let summary = OrderSummary {
            items_total: totals.total_price,
            delivery_fee,
            total: totals.total_price + delivery_fee,
            item_count: u32::try_from(items.len()).unwrap_or(u32::MAX),
            total_savings: totals.total_savings,
        };

        let mut state = self.write();
        state.items = items;
        state.summary = Some(summary);
        state.phase = CheckoutPhase::Ready;
        Ok(CheckoutPhase::Ready)
    }

    /// Submit the order.
    ///
    /// Exactly-once: a second invocation while a submission is in flight is
    /// rejected with [`CheckoutError::SubmissionInProgress`] without issuing
    /// a second order-creation request. On success in cart mode the cart is
    /// cleared; direct mode never touched it. On failure the flow moves to
    /// `Failed` and may be retried with another explicit `submit()`.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::NotReady`] outside `Ready`/`Failed`, the
    /// in-progress rejection, or any remote failure.
    #[instrument(skip(self, cancel))]
    pub async fn submit(&self, cancel: &CancellationToken) -> Result<Confirmation, CheckoutError> {
        if self
            .processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CheckoutError::SubmissionInProgress);
        }

        let result = self.submit_inner(cancel).await;
        self.processing.store(false, Ordering::SeqCst);
        result
    }

    async fn submit_inner(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Confirmation, CheckoutError> {
        let (summary, items, previous_phase) = {
            let mut state = self.write();
            if !matches!(
                state.phase,
                CheckoutPhase::Ready | CheckoutPhase::Failed(_)
            ) {
                return Err(CheckoutError::NotReady);
            }
            let Some(summary) = state.summary.clone() else {
                return Err(CheckoutError::NotReady);
            };
            let previous = std::mem::replace(&mut state.phase, CheckoutPhase::Processing);
            (summary, state.items.clone(), previous)
        };

        let request = OrderRequest {
            items: items.iter().map(OrderItemRequest::from_line).collect(),
            total_amount: summary.total,
            delivery_fee: summary.delivery_fee,
            delivery_option: self.delivery,
        };

        let result = match &self.mode {
            Mode::Cart(_) => {
                with_cancellation(cancel, self.backend.submit_cart_order(&request)).await
            }
            Mode::Direct(_) => {
                with_cancellation(cancel, self.backend.submit_direct_order(&request)).await
            }
        };

        match result {
            Ok(order) => {
                if let Mode::Cart(cart) = &self.mode {
                    // The order exists server-side; a failed clear must not
                    // fail the checkout. The store clears locally regardless.
                    if let Err(e) = cart.clear_all(cancel).await {
                        tracing::warn!(error = %e, "cart clear after successful order failed");
                    }
                }
                self.write().phase = CheckoutPhase::Submitted;
                Ok(Confirmation {
                    order,
                    summary,
                    items,
                })
            }
            Err(ApiError::Cancelled) => {
                self.write().phase = previous_phase;
                Err(ApiError::Cancelled.into())
            }
            Err(e) => {
                let reason = e.reason();
                tracing::error!(error = %e, "order submission failed");
                self.write().phase = CheckoutPhase::Failed(reason);
                Err(e.into())
            }
        }
    }
}
