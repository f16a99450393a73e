//! Cart

use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result as FmtResult},
    num::ParseIntError,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// Catalog identifier of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    /// Wrap a raw catalog id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw catalog id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for ProductId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u64> for ProductId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Number of units of one product in one size.
pub type Quantity = u32;

/// Size label to quantity.
pub type SizeQuantities = BTreeMap<String, Quantity>;

/// A flattened cart entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine<'a> {
    /// Product in the cart.
    pub product: ProductId,

    /// Chosen size label.
    pub size: &'a str,

    /// Units held, always positive.
    pub quantity: Quantity,
}

/// Cart contents: product, then size, then quantity.
///
/// Every stored quantity is positive and no product maps to an empty set of
/// sizes. Transitions never touch the receiver; they return the next cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: BTreeMap<ProductId, SizeQuantities>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantity held for the given product and size, zero when absent.
    pub fn quantity(&self, product: ProductId, size: &str) -> Quantity {
        self.items
            .get(&product)
            .and_then(|sizes| sizes.get(size))
            .copied()
            .unwrap_or(0)
    }

    /// Sizes held for a product.
    pub fn sizes(&self, product: ProductId) -> Option<&SizeQuantities> {
        self.items.get(&product)
    }

    /// Whether the product is present in any size.
    pub fn contains(&self, product: ProductId) -> bool {
        self.items.contains_key(&product)
    }

    /// Products held in the cart.
    pub fn products(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.items.keys().copied()
    }

    /// Iterate every `(product, size, quantity)` entry.
    pub fn lines(&self) -> impl Iterator<Item = CartLine<'_>> + '_ {
        self.items.iter().flat_map(|(product, sizes)| {
            sizes.iter().map(|(size, quantity)| CartLine {
                product: *product,
                size: size.as_str(),
                quantity: *quantity,
            })
        })
    }

    /// Total units across all products and sizes.
    pub fn item_count(&self) -> u64 {
        self.lines().map(|line| u64::from(line.quantity)).sum()
    }

    /// Check if the cart holds nothing.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The next cart with one more unit of `product` in `size`.
    #[must_use]
    pub fn with_item_added(&self, product: ProductId, size: &str) -> Self {
        let mut next = self.clone();

        let quantity = next
            .items
            .entry(product)
            .or_default()
            .entry(size.to_string())
            .or_insert(0);

        *quantity = quantity.saturating_add(1);

        next
    }

    /// The next cart with `product` in `size` set to exactly `quantity`.
    ///
    /// Zero or negative quantities remove the entry, and the product with it
    /// once no sizes remain. Removing an absent entry yields an equal cart.
    #[must_use]
    pub fn with_quantity(&self, product: ProductId, size: &str, quantity: i64) -> Self {
        let mut next = self.clone();

        if quantity <= 0 {
            next.remove(product, size);

            return next;
        }

        let quantity = Quantity::try_from(quantity).unwrap_or(Quantity::MAX);

        next.items
            .entry(product)
            .or_default()
            .insert(size.to_string(), quantity);

        next
    }

    /// Drop zero quantities and empty size maps.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.items.retain(|_, sizes| {
            sizes.retain(|_, quantity| *quantity > 0);
            !sizes.is_empty()
        });

        self
    }

    fn remove(&mut self, product: ProductId, size: &str) {
        let Some(sizes) = self.items.get_mut(&product) else {
            return;
        };

        sizes.remove(size);

        if sizes.is_empty() {
            self.items.remove(&product);
        }
    }
}

impl FromIterator<(ProductId, String, Quantity)> for Cart {
    fn from_iter<I: IntoIterator<Item = (ProductId, String, Quantity)>>(iter: I) -> Self {
        let mut cart = Cart::new();

        for (product, size, quantity) in iter {
            cart.items.entry(product).or_default().insert(size, quantity);
        }

        cart.normalized()
    }
}
