//! Marula Core - Shared types and pure commerce logic.
//!
//! This crate provides the domain types and pure functions used by
//! `marula-engine` (cart/quotation state and the checkout workflow).
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no ambient state. Everything here is deterministic and
//! independently testable.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and the product/cart/order data model
//! - [`pricing`] - Effective-price resolution under promotional overrides
//! - [`totals`] - Folding line items into cart totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod totals;
pub mod types;

pub use types::*;
