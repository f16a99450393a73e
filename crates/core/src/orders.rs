//! Orders

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{cart::Cart, catalog::Catalog, pricing::Totals};

/// How the shopper intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Stripe checkout
    Stripe,

    /// Card payment
    Credit,

    /// PayPal
    Paypal,
}

impl PaymentMethod {
    /// Wire tag of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stripe => "stripe",
            Self::Credit => "credit",
            Self::Paypal => "paypal",
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Unrecognised payment method tag.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stripe" => Ok(Self::Stripe),
            "credit" => Ok(Self::Credit),
            "paypal" => Ok(Self::Paypal),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// Recipient and address details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryInfo {
    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Contact email
    pub email: String,

    /// Contact phone
    pub phone: String,

    /// Street address
    pub address: String,

    /// City
    pub city: String,

    /// State or region
    pub state: String,

    /// Postal code
    pub zip: String,

    /// Country
    pub country: String,
}

/// Required delivery field that is missing or unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryField {
    /// No usable email address
    Email,

    /// Neither a first nor a last name
    Name,
}

impl Display for DeliveryField {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Email => f.write_str("email"),
            Self::Name => f.write_str("name"),
        }
    }
}

impl DeliveryInfo {
    /// Check the recipient can be reached.
    ///
    /// # Errors
    ///
    /// Returns the first [`DeliveryField`] that is missing.
    pub fn validate(&self) -> Result<(), DeliveryField> {
        let email = self.email.trim();

        if email.is_empty() || !email.contains('@') {
            return Err(DeliveryField::Email);
        }

        if self.full_name().is_empty() {
            return Err(DeliveryField::Name);
        }

        Ok(())
    }

    /// First and last name joined with a space.
    pub fn full_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// An immutable snapshot of a cart at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: Uuid,
    created_at: Timestamp,
    items: Cart,
    subtotal: Decimal,
    delivery_fee: Decimal,
    total: Decimal,
    payment_method: PaymentMethod,
    delivery: DeliveryInfo,
}

impl Order {
    /// Snapshot `items` with the given totals.
    pub fn new(
        items: Cart,
        totals: Totals,
        payment_method: PaymentMethod,
        delivery: DeliveryInfo,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            created_at,
            items,
            subtotal: totals.subtotal,
            delivery_fee: totals.delivery_fee,
            total: totals.total,
            payment_method,
            delivery,
        }
    }

    /// Local order id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When the snapshot was taken.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Ordered cart contents.
    pub fn items(&self) -> &Cart {
        &self.items
    }

    /// Sum of the line amounts.
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Delivery fee charged.
    pub fn delivery_fee(&self) -> Decimal {
        self.delivery_fee
    }

    /// Amount due.
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Chosen payment method.
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Recipient details.
    pub fn delivery(&self) -> &DeliveryInfo {
        &self.delivery
    }

    /// Plain-text summary for order-detail emails.
    ///
    /// Lists every product by name, or `Unknown Product` when the catalog no
    /// longer carries it, with its quantity across all sizes.
    pub fn summary(&self, catalog: &Catalog) -> String {
        let mut summary = format!(
            "Order #{}\nDate: {}\nTotal: {}\nItems:\n",
            self.id,
            self.created_at.strftime("%b %-d, %Y, %-I:%M %p"),
            self.total
        );

        for product in self.items.products() {
            let name = catalog
                .get(product)
                .map_or("Unknown Product", |product| product.name.as_str());

            let quantity: u64 = self
                .items
                .sizes(product)
                .map(|sizes| sizes.values().map(|quantity| u64::from(*quantity)).sum())
                .unwrap_or(0);

            summary.push_str(&format!("{name} - Quantity: {quantity}\n"));
        }

        summary
    }
}

/// Acknowledgement from the order-submission collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderConfirmation {
    /// Reference the order is recorded under.
    pub reference: String,

    /// Created order document, when the collaborator returns one.
    pub response: Option<serde_json::Value>,
}

/// A submitted order and its confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    /// Snapshot that was submitted.
    pub order: Order,

    /// Collaborator acknowledgement.
    pub confirmation: OrderConfirmation,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        cart::ProductId,
        catalog::Product,
        pricing::{DEFAULT_DELIVERY_FEE, Totals},
    };

    use super::*;

    fn delivery() -> DeliveryInfo {
        DeliveryInfo {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            ..DeliveryInfo::default()
        }
    }

    #[test]
    fn payment_method_round_trips_through_str() -> TestResult {
        assert_eq!("PayPal".parse::<PaymentMethod>()?, PaymentMethod::Paypal);
        assert_eq!(PaymentMethod::Credit.to_string(), "credit");
        assert_eq!(
            "cash".parse::<PaymentMethod>(),
            Err(UnknownPaymentMethod("cash".to_string()))
        );

        Ok(())
    }

    #[test]
    fn delivery_requires_email() {
        let info = DeliveryInfo {
            email: "  ".to_string(),
            ..delivery()
        };

        assert_eq!(info.validate(), Err(DeliveryField::Email));

        let info = DeliveryInfo {
            email: "not-an-address".to_string(),
            ..delivery()
        };

        assert_eq!(info.validate(), Err(DeliveryField::Email));
    }

    #[test]
    fn delivery_requires_a_name() {
        let info = DeliveryInfo {
            first_name: String::new(),
            last_name: " ".to_string(),
            ..delivery()
        };

        assert_eq!(info.validate(), Err(DeliveryField::Name));
    }

    #[test]
    fn delivery_accepts_last_name_only() {
        let info = DeliveryInfo {
            first_name: String::new(),
            ..delivery()
        };

        assert_eq!(info.validate(), Ok(()));
        assert_eq!(info.full_name(), "Lovelace");
    }

    #[test]
    fn order_snapshot_carries_totals() {
        let cart = Cart::new().with_quantity(ProductId::new(7), "L", 3);
        let totals = Totals::for_order(Decimal::new(5997, 2), DEFAULT_DELIVERY_FEE);

        let order = Order::new(
            cart.clone(),
            totals,
            PaymentMethod::Stripe,
            delivery(),
            Timestamp::UNIX_EPOCH,
        );

        assert_eq!(order.items(), &cart);
        assert_eq!(order.subtotal(), Decimal::new(5997, 2));
        assert_eq!(order.delivery_fee(), DEFAULT_DELIVERY_FEE);
        assert_eq!(order.total(), Decimal::new(6497, 2));
        assert_eq!(order.payment_method(), PaymentMethod::Stripe);
        assert_eq!(order.created_at(), Timestamp::UNIX_EPOCH);
    }

    #[test]
    fn summary_names_products_and_sums_sizes() {
        let catalog = Catalog::new([Product {
            id: ProductId::new(7),
            name: "Hat".to_string(),
            price: Decimal::new(1999, 2),
            description: None,
            image_urls: Vec::new(),
            category_id: None,
            sub_category: None,
            sizes: None,
        }]);

        let cart = Cart::new()
            .with_quantity(ProductId::new(7), "L", 3)
            .with_quantity(ProductId::new(7), "M", 1)
            .with_quantity(ProductId::new(8), "S", 2);

        let order = Order::new(
            cart,
            Totals::for_order(Decimal::new(7996, 2), DEFAULT_DELIVERY_FEE),
            PaymentMethod::Paypal,
            delivery(),
            Timestamp::UNIX_EPOCH,
        );

        let summary = order.summary(&catalog);

        assert!(summary.starts_with(&format!("Order #{}\n", order.id())));
        assert!(summary.contains("Date: Jan 1, 1970, 12:00 AM\n"));
        assert!(summary.contains("Total: 84.96\n"));
        assert!(summary.contains("Hat - Quantity: 4\n"));
        assert!(summary.contains("Unknown Product - Quantity: 2\n"));
    }
}
