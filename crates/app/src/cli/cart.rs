use std::io;

use clap::{Args, Subcommand};
use storefront::{cart::ProductId, catalog::Catalog, store::CartStore};
use storefront_app::{context::AppContext, render};
use tracing::warn;

use super::report_warnings;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart with its totals
    Show,

    /// Add one unit of a product in a size
    Add(SelectionArgs),

    /// Set the quantity of a product in a size; zero or less removes it
    Set(SetArgs),

    /// Remove a product size from the cart
    Remove(SelectionArgs),

    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
struct SelectionArgs {
    /// Product id
    #[arg(long)]
    product: ProductId,

    /// Size label, e.g. M
    #[arg(long)]
    size: String,
}

#[derive(Debug, Args)]
struct SetArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// New quantity
    #[arg(long, allow_negative_numbers = true)]
    quantity: i64,
}

pub(crate) async fn run(context: &AppContext, command: CartCommand) -> Result<(), String> {
    let mut store = context.cart_store();
    report_warnings(&mut store);

    match command.command {
        CartSubcommand::Show => {
            let catalog = catalog_or_empty(context).await;
            let totals = store.totals(&catalog);

            render::write_cart(
                io::stdout().lock(),
                &store.cart(),
                &catalog,
                &totals,
                context.currency,
            )
            .map_err(|error| format!("failed to print cart: {error}"))?;
        }
        CartSubcommand::Add(selection) => {
            check_size(context, &selection).await?;

            store
                .add_item(selection.product, &selection.size)
                .map_err(|error| format!("failed to add item: {error}"))?;

            print_count(&store);
        }
        CartSubcommand::Set(args) => {
            store.set_quantity(args.selection.product, &args.selection.size, args.quantity);
            print_count(&store);
        }
        CartSubcommand::Remove(selection) => {
            store.set_quantity(selection.product, &selection.size, 0);
            print_count(&store);
        }
        CartSubcommand::Clear => {
            store.clear();
            println!("cart cleared");
        }
    }

    report_warnings(&mut store);

    Ok(())
}

/// Reject sizes the product is not sold in, when the catalog knows the product.
async fn check_size(context: &AppContext, selection: &SelectionArgs) -> Result<(), String> {
    let catalog = match context.catalog().await {
        Ok(catalog) => catalog,
        Err(error) => {
            warn!("catalog unavailable, size not checked: {error}");
            return Ok(());
        }
    };

    match catalog.get(selection.product) {
        Some(product) if !product.offers_size(selection.size.trim()) => Err(format!(
            "{} is not sold in size {} (available: {})",
            product.name,
            selection.size.trim(),
            product.available_sizes().join(", ")
        )),
        _ => Ok(()),
    }
}

async fn catalog_or_empty(context: &AppContext) -> Catalog {
    context.catalog().await.unwrap_or_else(|error| {
        warn!("catalog unavailable, prices not shown: {error}");
        Catalog::default()
    })
}

fn print_count(store: &CartStore) {
    println!("cart holds {} item(s)", store.item_count());
}
