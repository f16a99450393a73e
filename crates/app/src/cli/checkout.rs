use clap::Args;
use storefront::{
    orders::{DeliveryInfo, PaymentMethod},
    pricing::format_amount,
};
use storefront_app::{context::AppContext, render};

use super::report_warnings;

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Payment method (stripe, credit, paypal)
    #[arg(long, default_value = "stripe")]
    payment: PaymentMethod,

    #[command(flatten)]
    delivery: DeliveryArgs,
}

#[derive(Debug, Args)]
struct DeliveryArgs {
    /// Recipient first name
    #[arg(long, default_value = "")]
    first_name: String,

    /// Recipient last name
    #[arg(long, default_value = "")]
    last_name: String,

    /// Contact email
    #[arg(long, default_value = "")]
    email: String,

    /// Contact phone number
    #[arg(long, default_value = "")]
    phone: String,

    /// Street address
    #[arg(long, default_value = "")]
    address: String,

    #[arg(long, default_value = "")]
    city: String,

    #[arg(long, default_value = "")]
    state: String,

    #[arg(long, default_value = "")]
    zip: String,

    #[arg(long, default_value = "")]
    country: String,
}

impl From<DeliveryArgs> for DeliveryInfo {
    fn from(args: DeliveryArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
            address: args.address,
            city: args.city,
            state: args.state,
            zip: args.zip,
            country: args.country,
        }
    }
}

pub(crate) async fn run(context: &AppContext, args: CheckoutArgs) -> Result<(), String> {
    let mut store = context.cart_store();
    report_warnings(&mut store);

    let catalog = context
        .catalog()
        .await
        .map_err(|error| format!("failed to load products: {error}"))?;

    let result = store
        .checkout(
            args.payment,
            args.delivery.into(),
            &catalog,
            context.submitter.as_ref(),
        )
        .await;

    report_warnings(&mut store);

    let placed = result
        .map_err(|error| format!("checkout failed: {}", render::error_chain(&error)))?;

    let total = format_amount(placed.order.total(), context.currency)
        .map_err(|error| format!("failed to format total: {error}"))?;

    println!("order placed: {}", placed.confirmation.reference);
    println!("total charged: {total}");
    print!("{}", placed.order.summary(&catalog));

    Ok(())
}
