//! Terminal tables for products, the cart, and order history.

use std::{error::Error as StdError, io, iter};

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use storefront::{
    cart::Cart,
    catalog::{Catalog, Categories, Product},
    orders::Order,
    pricing::{PricingError, Totals, format_amount},
};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

/// Errors raised while rendering output.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Output could not be written.
    #[error("failed to write output")]
    Io(#[from] io::Error),

    /// An amount could not be expressed in the display currency.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Write the product listing, labelling categories by name where known.
///
/// # Errors
///
/// Returns an error if a price cannot be formatted or the output fails.
pub fn write_products(
    mut out: impl io::Write,
    products: &[&Product],
    categories: &Categories,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    if products.is_empty() {
        writeln!(out, "No products found")?;
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Category", "Type", "Sizes", "Price"]);

    for product in products {
        let category = product
            .category_id
            .map(|id| categories.name(id).map_or_else(|| id.to_string(), str::to_string))
            .unwrap_or_default();

        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            category,
            product.sub_category.clone().unwrap_or_default(),
            product.available_sizes().join(" "),
            format_amount(product.price, currency)?,
        ]);
    }

    write_table(&mut out, builder, 5..6)
}

/// Write the cart lines followed by the totals summary.
///
/// # Errors
///
/// Returns an error if an amount cannot be formatted or the output fails.
pub fn write_cart(
    mut out: impl io::Write,
    cart: &Cart,
    catalog: &Catalog,
    totals: &Totals,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    if cart.is_empty() {
        writeln!(out, "Your cart is empty")?;
    } else {
        let mut builder = Builder::default();
        builder.push_record(["ID", "Item", "Size", "Qty", "Unit", "Line total"]);

        for line in cart.lines() {
            let product = catalog.get(line.product);
            let name = product.map_or("Unknown Product", |product| product.name.as_str());

            let (unit, line_total) = match product {
                Some(product) => (
                    format_amount(product.price, currency)?,
                    format_amount(
                        product.price.saturating_mul(Decimal::from(line.quantity)),
                        currency,
                    )?,
                ),
                None => ("-".to_string(), "-".to_string()),
            };

            builder.push_record([
                line.product.to_string(),
                name.to_string(),
                line.size.to_string(),
                line.quantity.to_string(),
                unit,
                line_total,
            ]);
        }

        write_table(&mut out, builder, 3..6)?;
    }

    writeln!(out, "Subtotal:     {}", format_amount(totals.subtotal, currency)?)?;
    writeln!(out, "Delivery fee: {}", format_amount(totals.delivery_fee, currency)?)?;
    writeln!(out, "Total:        {}", format_amount(totals.total, currency)?)?;

    Ok(())
}

/// Write the order history, oldest first.
///
/// # Errors
///
/// Returns an error if a total cannot be formatted or the output fails.
pub fn write_orders(
    mut out: impl io::Write,
    orders: &[Order],
    currency: &'static Currency,
) -> Result<(), RenderError> {
    if orders.is_empty() {
        writeln!(out, "No orders placed yet")?;
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["Order", "Date", "Items", "Payment", "Total"]);

    for order in orders {
        builder.push_record([
            order.id().to_string(),
            order.created_at().strftime("%b %-d, %Y").to_string(),
            order.items().item_count().to_string(),
            order.payment_method().to_string(),
            format_amount(order.total(), currency)?,
        ]);
    }

    write_table(&mut out, builder, 2..5)
}

/// Join an error with every underlying cause, outermost first.
pub fn error_chain(error: &(dyn StdError + 'static)) -> String {
    iter::successors(Some(error), |&error| error.source())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    numeric: std::ops::Range<usize>,
) -> Result<(), RenderError> {
    let mut table = builder.build();

    table.with(Theme::from(Style::modern_rounded()));
    table.modify(Columns::new(numeric), Alignment::right());
    table.modify(Rows::first(), Alignment::center());

    writeln!(out, "{table}")?;

    Ok(())
}
