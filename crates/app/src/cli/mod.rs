use clap::{Parser, Subcommand};
use storefront::store::CartStore;
use storefront_app::{config::AppConfig, context::AppContext, observability};

mod cart;
mod checkout;
mod orders;
mod products;

#[derive(Debug, Parser)]
#[command(name = "storefront-app", about = "Storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse the product catalog
    Products(products::ProductsArgs),

    /// Inspect and edit the saved cart
    Cart(cart::CartCommand),

    /// Place an order for the cart contents
    Checkout(checkout::CheckoutArgs),

    /// List orders recorded in the local order log
    Orders(orders::OrdersArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init(&self.config.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        let context = AppContext::from_config(&self.config)
            .map_err(|error| format!("failed to initialise storefront: {error}"))?;

        match self.command {
            Commands::Products(args) => products::run(&context, args).await,
            Commands::Cart(command) => cart::run(&context, command).await,
            Commands::Checkout(args) => checkout::run(&context, args).await,
            Commands::Orders(args) => orders::run(&context, args).await,
        }
    }
}

/// Report queued persistence failures without failing the command.
fn report_warnings(store: &mut CartStore) {
    for warning in store.take_warnings() {
        eprintln!("warning: {warning}");
    }
}
