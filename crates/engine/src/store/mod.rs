//! Local mirrors of the shopper's cart and quotation list.
//!
//! Each store owns the authoritative local copy of its list: operations
//! mutate local state eagerly once the server confirms, and reads never
//! block on the network. A failed fetch keeps the previous item list
//! around (stale-but-available reads), with the failure recorded in
//! [`StoreStatus::Error`].
//!
//! Stores never retry automatically, and provide no mutual exclusion of
//! their own: the UI layer issues one operation at a time per store.
//! Concurrent operations racing on the same store are an accepted
//! limitation - the last response to settle wins.

pub mod cart;
pub mod quotation;

pub use cart::CartStore;
pub use quotation::QuotationStore;

use std::future::Future;

use tokio_util::sync::CancellationToken;

use marula_core::LineItem;
use marula_core::totals::Totals;

use crate::error::ApiError;

/// Load status of a store, live for the whole session.
///
/// `Idle -> Loading -> (Ready | Error) -> Loading -> ...`; there is no
/// terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreStatus {
    /// Nothing fetched yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// Items reflect the last confirmed server state.
    Ready,
    /// The last operation failed; items may be stale.
    Error(String),
}

/// A read-only snapshot of store state handed to the UI.
///
/// Totals are derived and recomputed after every mutation, never stored
/// authoritatively anywhere else.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub items: Vec<LineItem>,
    pub status: StoreStatus,
    pub totals: Totals,
}

/// Replace the line for the same product, or append.
///
/// Used after an add operation: the server is authoritative for the merged
/// quantity, so an existing line for that product is replaced wholesale by
/// the server's returned item. Order of unrelated lines is preserved.
pub(crate) fn upsert_by_product(items: &mut Vec<LineItem>, incoming: LineItem) {
    match items
        .iter_mut()
        .find(|item| item.product.id == incoming.product.id)
    {
        Some(existing) => *existing = incoming,
        None => items.push(incoming),
    }
}

/// Race a remote call against the operation's cancellation token.
///
/// A cancelled operation resolves to [`ApiError::Cancelled`] without
/// waiting for the remote call, so an abandoned flow never mutates state
/// after the caller has navigated away.
pub(crate) async fn with_cancellation<T, F>(
    cancel: &CancellationToken,
    remote: F,
) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    if cancel.is_cancelled() {
        return Err(ApiError::Cancelled);
    }
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ApiError::Cancelled),
        result = remote => result,
    }
}
