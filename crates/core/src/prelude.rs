//! Storefront prelude.
//!
//! Convenience exports for views and application roots.

pub use crate::{
    cart::{Cart, CartLine, ProductId, Quantity},
    catalog::{Catalog, CatalogError, CatalogQuery, Categories, Category, PriceSort, Product},
    orders::{
        DeliveryField, DeliveryInfo, Order, OrderConfirmation, PaymentMethod, PlacedOrder,
    },
    pricing::{DEFAULT_DELIVERY_FEE, PricingError, Totals, format_amount, total_amount},
    storage::{FileStore, InMemoryStore, KeyValueStore, StorageError},
    store::{CartError, CartStore, CheckoutError, PersistenceOp, PersistenceWarning},
    submission::{LocalOrderLog, OrderSubmitter, SubmissionError},
};
