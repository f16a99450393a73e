//! Cart store
//!
//! The authoritative in-memory cart for one shopping session. Each mutation
//! runs a pure [`Cart`] transition, installs the result as a fresh
//! [`Arc`], then persists it. Persistence problems are logged and queued as
//! [`PersistenceWarning`]s; they never interrupt the shopper.

use std::{fmt, mem, sync::Arc};

use jiff::Timestamp;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    cart::{Cart, ProductId},
    catalog::Catalog,
    orders::{DeliveryField, DeliveryInfo, Order, PaymentMethod, PlacedOrder},
    pricing::{DEFAULT_DELIVERY_FEE, Totals, total_amount},
    storage::{CART_STORAGE_KEY, KeyValueStore, StorageError},
    submission::{OrderSubmitter, SubmissionError},
};

/// Errors raised by cart mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// No size was chosen.
    #[error("please select a size")]
    InvalidSelection,
}

/// Errors raised by checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("your cart is empty")]
    EmptyCart,

    /// The recipient cannot be identified.
    #[error("missing delivery {0}")]
    MissingDeliveryInfo(DeliveryField),

    /// The order could not be recorded; the cart is unchanged.
    #[error("failed to submit order")]
    Submission(#[from] SubmissionError),
}

/// Storage step that did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceOp {
    /// Rehydrating the saved cart
    Load,

    /// Writing the current cart
    Save,
}

/// A recovered storage failure, reported to the shopper without blocking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceWarning {
    /// Step that failed
    pub op: PersistenceOp,

    /// What went wrong
    pub message: String,
}

impl fmt::Display for PersistenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self.op {
            PersistenceOp::Load => "restore the saved cart",
            PersistenceOp::Save => "save the cart",
        };

        write!(f, "could not {step}: {}", self.message)
    }
}

/// Owner of the session's cart.
#[derive(Debug)]
pub struct CartStore {
    cart: Arc<Cart>,
    storage: Arc<dyn KeyValueStore>,
    delivery_fee: Decimal,
    warnings: Vec<PersistenceWarning>,
}

impl CartStore {
    /// Start a session, adopting the saved cart when it is readable.
    ///
    /// A missing or malformed saved cart starts the session empty.
    pub fn initialize(storage: Arc<dyn KeyValueStore>) -> Self {
        let mut store = Self {
            cart: Arc::new(Cart::new()),
            storage,
            delivery_fee: DEFAULT_DELIVERY_FEE,
            warnings: Vec::new(),
        };

        match store.storage.get(CART_STORAGE_KEY) {
            Ok(Some(saved)) => match serde_json::from_str::<Cart>(&saved) {
                Ok(cart) => {
                    let cart = cart.normalized();
                    debug!(items = cart.item_count(), "restored saved cart");
                    store.cart = Arc::new(cart);
                }
                Err(error) => store.warn(PersistenceOp::Load, &error),
            },
            Ok(None) => {}
            Err(error) => store.warn(PersistenceOp::Load, &error),
        }

        store
    }

    /// Replace the delivery fee charged at checkout.
    #[must_use]
    pub fn with_delivery_fee(mut self, delivery_fee: Decimal) -> Self {
        self.delivery_fee = delivery_fee;
        self
    }

    /// Delivery fee charged at checkout.
    pub fn delivery_fee(&self) -> Decimal {
        self.delivery_fee
    }

    /// Current cart snapshot.
    ///
    /// Every effective mutation installs a new allocation, so
    /// [`Arc::ptr_eq`] between two snapshots tells whether anything changed.
    pub fn cart(&self) -> Arc<Cart> {
        Arc::clone(&self.cart)
    }

    /// Add one unit of `product` in `size`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidSelection`] if `size` is blank.
    pub fn add_item(&mut self, product: ProductId, size: &str) -> Result<(), CartError> {
        let size = size.trim();

        if size.is_empty() {
            return Err(CartError::InvalidSelection);
        }

        let next = self.cart.with_item_added(product, size);
        debug!(%product, size, quantity = next.quantity(product, size), "added to cart");

        self.replace(next);

        Ok(())
    }

    /// Set `product` in `size` to exactly `quantity`; zero or less removes it.
    ///
    /// Sizes are trimmed as in [`CartStore::add_item`]; a blank size leaves
    /// the cart unchanged.
    pub fn set_quantity(&mut self, product: ProductId, size: &str, quantity: i64) {
        let size = size.trim();

        if size.is_empty() {
            debug!(%product, quantity, "ignoring quantity update without a size");
            return;
        }

        let next = self.cart.with_quantity(product, size, quantity);
        debug!(%product, size, quantity, "set cart quantity");

        self.replace(next);
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.replace(Cart::new());
    }

    /// Units across every product and size.
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    /// Cart value at catalog prices; unknown products count as zero.
    pub fn total_amount(&self, catalog: &Catalog) -> Decimal {
        total_amount(&self.cart, catalog)
    }

    /// Totals to show in the cart summary.
    pub fn totals(&self, catalog: &Catalog) -> Totals {
        Totals::estimate(self.total_amount(catalog), self.delivery_fee)
    }

    /// Validate checkout inputs and snapshot the cart as an order.
    ///
    /// The cart itself is left as is, and may keep changing while the order
    /// is submitted.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] or
    /// [`CheckoutError::MissingDeliveryInfo`] when preconditions fail.
    pub fn prepare_order(
        &self,
        payment_method: PaymentMethod,
        delivery: DeliveryInfo,
        catalog: &Catalog,
    ) -> Result<Order, CheckoutError> {
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        delivery
            .validate()
            .map_err(CheckoutError::MissingDeliveryInfo)?;

        let totals = Totals::for_order(self.total_amount(catalog), self.delivery_fee);

        Ok(Order::new(
            (*self.cart).clone(),
            totals,
            payment_method,
            delivery,
            Timestamp::now(),
        ))
    }

    /// Clear the cart after its order was accepted.
    pub fn complete_checkout(&mut self, order: &Order) {
        info!(order = %order.id(), total = %order.total(), "order placed, clearing cart");

        self.clear();
    }

    /// Snapshot the cart, submit it, and clear the cart once accepted.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if validation fails or the submitter
    /// rejects the order. The cart is untouched in both cases.
    pub async fn checkout(
        &mut self,
        payment_method: PaymentMethod,
        delivery: DeliveryInfo,
        catalog: &Catalog,
        submitter: &dyn OrderSubmitter,
    ) -> Result<PlacedOrder, CheckoutError> {
        let order = self.prepare_order(payment_method, delivery, catalog)?;

        let confirmation = submitter.submit(&order).await.map_err(|error| {
            warn!(order = %order.id(), "order submission failed: {error}");
            CheckoutError::Submission(error)
        })?;

        self.complete_checkout(&order);

        Ok(PlacedOrder {
            order,
            confirmation,
        })
    }

    /// Drain the storage warnings raised since the last call.
    pub fn take_warnings(&mut self) -> Vec<PersistenceWarning> {
        mem::take(&mut self.warnings)
    }

    fn replace(&mut self, next: Cart) {
        if *self.cart != next {
            self.cart = Arc::new(next);
        }

        self.persist();
    }

    fn persist(&mut self) {
        let result = if self.cart.is_empty() {
            self.storage.remove(CART_STORAGE_KEY)
        } else {
            serde_json::to_string(&*self.cart)
                .map_err(StorageError::from)
                .and_then(|serialized| self.storage.set(CART_STORAGE_KEY, &serialized))
        };

        if let Err(error) = result {
            self.warn(PersistenceOp::Save, &error);
        }
    }

    fn warn(&mut self, op: PersistenceOp, error: &dyn std::error::Error) {
        warn!(?op, "cart storage failure: {error}");

        self.warnings.push(PersistenceWarning {
            op,
            message: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        catalog::Product,
        orders::OrderConfirmation,
        storage::InMemoryStore,
        submission::{LocalOrderLog, MockOrderSubmitter},
    };

    use super::*;

    const SHIRT: ProductId = ProductId::new(42);
    const HAT: ProductId = ProductId::new(7);

    #[derive(Debug)]
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::LockPoisoned("read"))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("quota exceeded")))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("quota exceeded")))
        }
    }

    fn catalog() -> Catalog {
        Catalog::new([Product {
            id: HAT,
            name: "Hat".to_string(),
            price: Decimal::new(1999, 2),
            description: None,
            image_urls: Vec::new(),
            category_id: None,
            sub_category: None,
            sizes: None,
        }])
    }

    fn delivery() -> DeliveryInfo {
        DeliveryInfo {
            first_name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            ..DeliveryInfo::default()
        }
    }

    fn empty_store() -> (CartStore, InMemoryStore) {
        let storage = InMemoryStore::new();
        let store = CartStore::initialize(Arc::new(storage.clone()));

        (store, storage)
    }

    #[test]
    fn starts_empty_without_saved_cart() {
        let (store, _) = empty_store();

        assert_eq!(store.item_count(), 0);
        assert!(store.cart().is_empty());
    }

    #[test]
    fn restores_saved_cart() {
        let storage = InMemoryStore::with_value(CART_STORAGE_KEY, r#"{"7":{"L":3}}"#);

        let store = CartStore::initialize(Arc::new(storage));

        assert_eq!(store.cart().quantity(HAT, "L"), 3);
    }

    #[test]
    fn malformed_saved_cart_starts_empty_with_warning() {
        let storage = InMemoryStore::with_value(CART_STORAGE_KEY, "{not json");

        let mut store = CartStore::initialize(Arc::new(storage));
        let warnings = store.take_warnings();

        assert!(store.cart().is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings.first().map(|w| w.op), Some(PersistenceOp::Load));
    }

    #[test]
    fn blank_size_is_invalid_selection() {
        let (mut store, _) = empty_store();

        assert_eq!(store.add_item(SHIRT, ""), Err(CartError::InvalidSelection));
        assert_eq!(store.add_item(SHIRT, "   "), Err(CartError::InvalidSelection));
        assert_eq!(store.item_count(), 0);
    }

    #[test]
    fn set_quantity_trims_sizes_like_add_item() -> TestResult {
        let (mut store, storage) = empty_store();

        store.add_item(SHIRT, " M ")?;
        assert_eq!(store.cart().quantity(SHIRT, "M"), 1);

        store.set_quantity(SHIRT, " M ", 3);
        assert_eq!(store.cart().quantity(SHIRT, "M"), 3);

        store.set_quantity(SHIRT, " M ", 0);
        assert!(store.cart().is_empty());
        assert_eq!(storage.get(CART_STORAGE_KEY)?, None);

        Ok(())
    }

    #[test]
    fn set_quantity_ignores_blank_size() -> TestResult {
        let (mut store, storage) = empty_store();

        store.add_item(HAT, "L")?;
        let before = store.cart();

        store.set_quantity(SHIRT, "", 3);
        store.set_quantity(SHIRT, "   ", 2);

        assert!(Arc::ptr_eq(&before, &store.cart()));
        assert!(!store.cart().contains(SHIRT));
        assert_eq!(
            storage.get(CART_STORAGE_KEY)?.as_deref(),
            Some(r#"{"7":{"L":1}}"#)
        );

        Ok(())
    }

    #[test]
    fn add_then_remove_scenario() -> TestResult {
        let (mut store, storage) = empty_store();

        store.add_item(SHIRT, "M")?;
        assert_eq!(store.item_count(), 1);

        store.add_item(SHIRT, "M")?;
        assert_eq!(store.item_count(), 2);
        assert_eq!(
            storage.get(CART_STORAGE_KEY)?.as_deref(),
            Some(r#"{"42":{"M":2}}"#)
        );

        store.set_quantity(SHIRT, "M", 0);
        assert_eq!(store.item_count(), 0);
        assert!(!store.cart().contains(SHIRT));
        assert_eq!(storage.get(CART_STORAGE_KEY)?, None);

        Ok(())
    }

    #[test]
    fn mutation_installs_new_snapshot() -> TestResult {
        let (mut store, _) = empty_store();

        store.add_item(SHIRT, "M")?;
        let before = store.cart();

        store.add_item(SHIRT, "M")?;
        let after = store.cart();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.quantity(SHIRT, "M"), 1);
        assert_eq!(after.quantity(SHIRT, "M"), 2);

        Ok(())
    }

    #[test]
    fn no_op_removal_keeps_snapshot() -> TestResult {
        let (mut store, _) = empty_store();

        store.add_item(HAT, "L")?;
        let before = store.cart();

        store.set_quantity(SHIRT, "M", 0);
        store.set_quantity(SHIRT, "M", 0);

        assert!(Arc::ptr_eq(&before, &store.cart()));

        Ok(())
    }

    #[test]
    fn storage_failures_keep_memory_state() -> TestResult {
        let mut store = CartStore::initialize(Arc::new(BrokenStore));

        store.add_item(SHIRT, "M")?;
        store.add_item(SHIRT, "M")?;

        let warnings = store.take_warnings();

        assert_eq!(store.item_count(), 2);
        assert_eq!(warnings.len(), 3);
        assert_eq!(warnings.first().map(|w| w.op), Some(PersistenceOp::Load));
        assert_eq!(warnings.last().map(|w| w.op), Some(PersistenceOp::Save));
        assert!(store.take_warnings().is_empty());

        Ok(())
    }

    #[test]
    fn total_amount_uses_catalog_prices() {
        let (mut store, _) = empty_store();

        store.set_quantity(HAT, "L", 3);
        store.set_quantity(SHIRT, "M", 2);

        assert_eq!(store.total_amount(&catalog()), Decimal::new(5997, 2));
    }

    #[test]
    fn totals_add_configured_fee() {
        let (store, _) = empty_store();
        let mut store = store.with_delivery_fee(Decimal::new(750, 2));

        store.set_quantity(HAT, "L", 1);

        let totals = store.totals(&catalog());

        assert_eq!(totals.delivery_fee, Decimal::new(750, 2));
        assert_eq!(totals.total, Decimal::new(2749, 2));
    }

    #[tokio::test]
    async fn checkout_empty_cart_fails() {
        let (mut store, _) = empty_store();
        let mut submitter = MockOrderSubmitter::new();

        submitter.expect_submit().never();

        let result = store
            .checkout(PaymentMethod::Stripe, delivery(), &catalog(), &submitter)
            .await;

        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn checkout_requires_delivery_details() -> TestResult {
        let (mut store, _) = empty_store();
        let mut submitter = MockOrderSubmitter::new();

        submitter.expect_submit().never();
        store.add_item(HAT, "L")?;

        let result = store
            .checkout(
                PaymentMethod::Stripe,
                DeliveryInfo {
                    email: String::new(),
                    ..delivery()
                },
                &catalog(),
                &submitter,
            )
            .await;

        assert!(matches!(
            result,
            Err(CheckoutError::MissingDeliveryInfo(DeliveryField::Email))
        ));
        assert_eq!(store.item_count(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn successful_checkout_clears_cart() -> TestResult {
        let (mut store, storage) = empty_store();
        let mut submitter = MockOrderSubmitter::new();

        submitter
            .expect_submit()
            .once()
            .withf(|order| {
                order.subtotal() == Decimal::new(5997, 2)
                    && order.total() == Decimal::new(6497, 2)
                    && order.items().quantity(HAT, "L") == 3
            })
            .returning(|order| {
                Ok(OrderConfirmation {
                    reference: order.id().to_string(),
                    response: None,
                })
            });

        store.set_quantity(HAT, "L", 3);

        let placed = store
            .checkout(PaymentMethod::Paypal, delivery(), &catalog(), &submitter)
            .await?;

        assert_eq!(placed.confirmation.reference, placed.order.id().to_string());
        assert_eq!(placed.order.items().quantity(HAT, "L"), 3);
        assert_eq!(store.item_count(), 0);
        assert_eq!(storage.get(CART_STORAGE_KEY)?, None);

        Ok(())
    }

    #[tokio::test]
    async fn failed_submission_preserves_cart() -> TestResult {
        let (mut store, storage) = empty_store();
        let mut submitter = MockOrderSubmitter::new();

        submitter.expect_submit().once().returning(|_| {
            Err(SubmissionError::Rejected {
                status: 422,
                message: "Order failed".to_string(),
            })
        });

        store.set_quantity(HAT, "L", 3);
        store.add_item(SHIRT, "M")?;

        let before = store.cart();
        let persisted_before = storage.get(CART_STORAGE_KEY)?;

        let result = store
            .checkout(PaymentMethod::Stripe, delivery(), &catalog(), &submitter)
            .await;

        assert!(matches!(
            result,
            Err(CheckoutError::Submission(SubmissionError::Rejected { status: 422, .. }))
        ));
        assert_eq!(*store.cart(), *before);
        assert_eq!(storage.get(CART_STORAGE_KEY)?, persisted_before);

        Ok(())
    }

    #[tokio::test]
    async fn checkout_through_local_log_records_order() -> TestResult {
        let (mut store, storage) = empty_store();
        let log = LocalOrderLog::new(Arc::new(storage.clone()));

        store.set_quantity(HAT, "M", 2);

        let placed = store
            .checkout(PaymentMethod::Credit, delivery(), &catalog(), &log)
            .await?;

        assert_eq!(log.orders()?, vec![placed.order]);
        assert_eq!(store.item_count(), 0);

        Ok(())
    }

    #[test]
    fn prepared_order_is_decoupled_from_live_cart() -> TestResult {
        let (mut store, _) = empty_store();

        store.set_quantity(HAT, "L", 1);

        let order = store.prepare_order(PaymentMethod::Stripe, delivery(), &catalog())?;

        store.add_item(HAT, "L")?;

        assert_eq!(order.items().quantity(HAT, "L"), 1);
        assert_eq!(store.cart().quantity(HAT, "L"), 2);

        Ok(())
    }
}
