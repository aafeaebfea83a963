//! Effective-price resolution under promotional overrides.
//!
//! A product carries a list `price` and an optional promotional
//! `buy_now_price`. The effective price prefers the promotional price
//! whenever one is present, but a line only counts as *discounted* when the
//! promotional price is strictly below the list price. Catalog data where
//! the "promotion" is accidentally equal to or above the list price is
//! treated as non-discounted, with zero savings, while the effective price
//! still honours the override. This asymmetry is deliberate.
//!
//! Nothing here panics: missing or malformed prices degrade to zero.

use rust_decimal::Decimal;

use crate::types::Product;

/// The unit price a shopper actually pays for a product.
///
/// `buy_now_price` if present, else `price`, else zero.
#[must_use]
pub fn effective_price(product: &Product) -> Decimal {
    product
        .buy_now_price
        .or(product.price)
        .unwrap_or(Decimal::ZERO)
}

/// Whether the product is genuinely discounted.
///
/// True only when both prices are present and the promotional price is
/// strictly below the list price.
#[must_use]
pub fn has_discount(product: &Product) -> bool {
    match (product.buy_now_price, product.price) {
        (Some(buy_now), Some(list)) => buy_now < list,
        _ => false,
    }
}

/// Savings for `quantity` units, relative to the list price.
///
/// `(price - buy_now_price) * quantity` when [`has_discount`] holds, else
/// zero. Never negative by construction.
#[must_use]
pub fn savings(product: &Product, quantity: u32) -> Decimal {
    if !has_discount(product) {
        return Decimal::ZERO;
    }
    match (product.price, product.buy_now_price) {
        (Some(list), Some(buy_now)) => (list - buy_now) * Decimal::from(quantity),
        _ => Decimal::ZERO,
    }
}
