//! Marula Engine - client-side commerce engine.
//!
//! # Architecture
//!
//! - The remote store is the source of truth; local state is an eagerly
//!   reconciled mirror, never a cache with its own lifetime
//! - All remote access goes through the [`api::CommerceBackend`] trait so
//!   stores and the checkout workflow are testable against an in-memory fake
//! - Single-threaded, event-driven: stores do not provide mutual exclusion
//!   beyond the checkout submission guard; the UI issues one operation at a
//!   time per store
//!
//! # Modules
//!
//! - [`api`] - Backend trait, wire DTOs, and the REST implementation
//! - [`store`] - [`store::CartStore`] and [`store::QuotationStore`]
//! - [`checkout`] - The checkout state machine
//! - [`config`] - Environment-variable configuration
//! - [`credentials`] - Process-wide bearer token holder
//! - [`error`] - The [`error::ApiError`] failure taxonomy
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use marula_engine::{api::RestBackend, config::EngineConfig, credentials::CredentialStore};
//! use marula_engine::store::CartStore;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = EngineConfig::from_env()?;
//! let credentials = CredentialStore::new();
//! let backend = Arc::new(RestBackend::new(&config, credentials.clone())?);
//!
//! let cart = CartStore::new(Arc::clone(&backend));
//! cart.fetch_all(&CancellationToken::new()).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod config;
pub mod credentials;
pub mod error;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use checkout::{CheckoutError, CheckoutOrchestrator, CheckoutPhase, Confirmation};
pub use config::{DeliveryFees, EngineConfig};
pub use credentials::CredentialStore;
pub use error::ApiError;
pub use store::{CartStore, QuotationStore, StoreSnapshot, StoreStatus};
