//! Core types for Marula.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod line_item;
pub mod order;
pub mod product;
pub mod profile;

pub use id::*;
pub use line_item::LineItem;
pub use order::{DeliveryOption, DirectBuySelection, Order, OrderSummary};
pub use product::Product;
pub use profile::ShopperProfile;
