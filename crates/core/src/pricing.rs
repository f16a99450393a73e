//! Pricing

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use thiserror::Error;

use crate::{cart::Cart, catalog::Catalog};

/// Flat delivery fee charged on every order, 5.00.
pub const DEFAULT_DELIVERY_FEE: Decimal = Decimal::from_parts(500, 0, 0, false, 2);

/// Errors raised while formatting amounts.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Currency code is not one the storefront prices in.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Amount cannot be represented in minor units.
    #[error("amount {0} is out of range")]
    AmountOutOfRange(Decimal),
}

/// Sum `price × quantity` over the cart.
///
/// Products the catalog cannot resolve contribute nothing.
pub fn total_amount(cart: &Cart, catalog: &Catalog) -> Decimal {
    cart.lines()
        .filter_map(|line| {
            catalog
                .price(line.product)
                .map(|price| price.saturating_mul(Decimal::from(line.quantity)))
        })
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Subtotal, delivery fee and total of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    /// Sum of the line amounts
    pub subtotal: Decimal,

    /// Delivery fee charged
    pub delivery_fee: Decimal,

    /// Amount due
    pub total: Decimal,
}

impl Totals {
    /// Totals charged on an order: the fee is always added.
    pub fn for_order(subtotal: Decimal, delivery_fee: Decimal) -> Self {
        Self {
            subtotal,
            delivery_fee,
            total: subtotal.saturating_add(delivery_fee),
        }
    }

    /// Totals shown in the cart summary, where nothing is due on a zero
    /// subtotal.
    pub fn estimate(subtotal: Decimal, delivery_fee: Decimal) -> Self {
        if subtotal.is_zero() {
            return Self {
                subtotal,
                delivery_fee,
                total: Decimal::ZERO,
            };
        }

        Self::for_order(subtotal, delivery_fee)
    }
}

/// Resolve an ISO currency code.
///
/// # Errors
///
/// Returns [`PricingError::UnknownCurrency`] for codes other than GBP, USD and EUR.
pub fn currency_from_code(code: &str) -> Result<&'static Currency, PricingError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(PricingError::UnknownCurrency(other.to_string())),
    }
}

/// Express an amount as money in the given currency.
///
/// # Errors
///
/// Returns [`PricingError::AmountOutOfRange`] if the amount does not fit in
/// minor units.
pub fn to_money(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    let minor_units = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or(PricingError::AmountOutOfRange(amount))?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Format an amount for display, e.g. `$59.97`.
///
/// # Errors
///
/// Returns [`PricingError::AmountOutOfRange`] if the amount does not fit in
/// minor units.
pub fn format_amount(amount: Decimal, currency: &'static Currency) -> Result<String, PricingError> {
    to_money(amount, currency).map(|money| money.to_string())
}
