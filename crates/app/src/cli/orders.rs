use std::io;

use clap::Args;
use storefront::catalog::Catalog;
use storefront_app::{context::AppContext, render};
use tracing::warn;

#[derive(Debug, Args)]
pub(crate) struct OrdersArgs {
    /// Print the full text summary of each order
    #[arg(long)]
    summary: bool,
}

pub(crate) async fn run(context: &AppContext, args: OrdersArgs) -> Result<(), String> {
    let orders = context
        .order_log()
        .orders()
        .map_err(|error| format!("failed to read order history: {error}"))?;

    if !args.summary {
        return render::write_orders(io::stdout().lock(), &orders, context.currency)
            .map_err(|error| format!("failed to print orders: {error}"));
    }

    let catalog = context.catalog().await.unwrap_or_else(|error| {
        warn!("catalog unavailable, product names not shown: {error}");
        Catalog::default()
    });

    for order in &orders {
        println!("{}", order.summary(&catalog));
    }

    Ok(())
}
