//! Catalog
//!
//! Read-only product listing used for price lookups, size validation and
//! browsing. The storefront fetches it once at startup; nothing here mutates
//! a product.

use std::{fs, path::Path};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::cart::ProductId;

/// Sizes offered when a product does not list its own.
pub const DEFAULT_SIZES: [&str; 4] = ["S", "M", "L", "XL"];

/// Catalog loading errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading a catalog file.
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// JSON catalog document could not be parsed.
    #[error("failed to parse catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML catalog fixture could not be parsed.
    #[error("failed to parse catalog YAML: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// Product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog id
    pub id: ProductId,

    /// Display name
    pub name: String,

    /// Unit price
    pub price: Decimal,

    /// Long description
    #[serde(default)]
    pub description: Option<String>,

    /// Image references, first is the primary image
    #[serde(default)]
    pub image_urls: Vec<String>,

    /// Category the product is listed under
    #[serde(default)]
    pub category_id: Option<u64>,

    /// Free-form sub-category label
    #[serde(default)]
    pub sub_category: Option<String>,

    /// Sizes this product is sold in
    #[serde(default, deserialize_with = "deserialize_sizes")]
    pub sizes: Option<Vec<String>>,
}

impl Product {
    /// Sizes a shopper may choose from.
    pub fn available_sizes(&self) -> Vec<&str> {
        match &self.sizes {
            Some(sizes) if !sizes.is_empty() => sizes.iter().map(String::as_str).collect(),
            Some(_) | None => DEFAULT_SIZES.to_vec(),
        }
    }

    /// Whether `size` is one of the product's sizes.
    pub fn offers_size(&self, size: &str) -> bool {
        self.available_sizes().contains(&size)
    }

    /// Primary image, if any.
    pub fn image(&self) -> Option<&str> {
        self.image_urls.first().map(String::as_str)
    }
}

/// The API sends sizes either as a list or as a JSON-encoded string.
#[derive(Deserialize)]
#[serde(untagged)]
enum SizesRepr {
    List(Vec<String>),
    Encoded(String),
}

fn deserialize_sizes<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let sizes = match Option::<SizesRepr>::deserialize(deserializer)? {
        Some(SizesRepr::List(sizes)) => Some(sizes),
        // An unreadable encoding falls back to the default sizes.
        Some(SizesRepr::Encoded(encoded)) => serde_json::from_str(&encoded).ok(),
        None => None,
    };

    Ok(sizes)
}

/// Ordering applied to a catalog listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriceSort {
    /// Catalog order.
    #[default]
    Relevant,

    /// Cheapest first.
    LowToHigh,

    /// Most expensive first.
    HighToLow,
}

/// Catalog filter.
///
/// Empty category lists match every product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Accepted category ids.
    pub categories: Vec<u64>,

    /// Accepted sub-category labels.
    pub sub_categories: Vec<String>,

    /// Case-insensitive substring of the product name.
    pub search: Option<String>,

    /// Result ordering.
    pub sort: PriceSort,
}

impl CatalogQuery {
    fn matches(&self, product: &Product) -> bool {
        let category_match = self.categories.is_empty()
            || product
                .category_id
                .is_some_and(|category| self.categories.contains(&category));

        let sub_category_match = self.sub_categories.is_empty()
            || product
                .sub_category
                .as_ref()
                .is_some_and(|sub_category| self.sub_categories.contains(sub_category));

        let search_match = match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => product
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Some(_) | None => true,
        };

        category_match && sub_category_match && search_match
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    List(Vec<Product>),
    Wrapped { data: Vec<Product> },
}

/// Products fixture as stored in YAML.
#[derive(Debug, Deserialize)]
struct ProductsFixture {
    products: Vec<Product>,
}

/// Catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Create a catalog from a list of products.
    pub fn new(products: impl Into<Vec<Product>>) -> Self {
        Self {
            products: products.into(),
        }
    }

    /// Parse a catalog API response, either a bare list or a `data` envelope.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError::Json`] if the document is not a product list.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let products = match serde_json::from_str(json)? {
            CatalogDocument::List(products) | CatalogDocument::Wrapped { data: products } => {
                products
            }
        };

        Ok(Self::new(products))
    }

    /// Parse a YAML fixture with a top-level `products` list.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError::Yaml`] if the fixture is malformed.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let fixture: ProductsFixture = serde_norway::from_str(yaml)?;

        Ok(Self::new(fixture.products))
    }

    /// Load a catalog file, YAML when the extension says so and JSON otherwise.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&contents),
            _ => Self::from_json_str(&contents),
        }
    }

    /// Look up a product.
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    /// Unit price of a product.
    pub fn price(&self, id: ProductId) -> Option<Decimal> {
        self.get(id).map(|product| product.price)
    }

    /// All products in catalog order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products matching the query, in the requested order.
    pub fn query(&self, query: &CatalogQuery) -> Vec<&Product> {
        let mut matches: Vec<&Product> = self
            .products
            .iter()
            .filter(|product| query.matches(product))
            .collect();

        match query.sort {
            PriceSort::Relevant => {}
            PriceSort::LowToHigh => matches.sort_by(|a, b| a.price.cmp(&b.price)),
            PriceSort::HighToLow => matches.sort_by(|a, b| b.price.cmp(&a.price)),
        }

        matches
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl FromIterator<Product> for Catalog {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect::<Vec<_>>())
    }
}

/// Product category as listed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Id referenced by [`Product::category_id`]
    pub id: u64,

    /// Display name
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryDocument {
    List(Vec<Category>),
    Wrapped { data: Vec<Category> },
}

#[derive(Debug, Deserialize)]
struct CategoriesFixture {
    #[serde(default)]
    categories: Vec<Category>,
}

/// Category names, used to label and filter listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Categories {
    categories: Vec<Category>,
}

impl Categories {
    /// Create a lookup from a list of categories.
    pub fn new(categories: impl Into<Vec<Category>>) -> Self {
        Self {
            categories: categories.into(),
        }
    }

    /// Parse a categories API response, either a bare list or a `data` envelope.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError::Json`] if the document is not a category list.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let categories = match serde_json::from_str(json)? {
            CategoryDocument::List(categories)
            | CategoryDocument::Wrapped { data: categories } => categories,
        };

        Ok(Self::new(categories))
    }

    /// Read the optional `categories` list of a YAML fixture.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError::Yaml`] if the fixture is malformed.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let fixture: CategoriesFixture = serde_norway::from_str(yaml)?;

        Ok(Self::new(fixture.categories))
    }

    /// Categories of a catalog file. Only YAML fixtures carry them.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&fs::read_to_string(path)?),
            _ => Ok(Self::default()),
        }
    }

    /// Name of the category with `id`.
    pub fn name(&self, id: u64) -> Option<&str> {
        self.categories
            .iter()
            .find(|category| category.id == id)
            .map(|category| category.name.as_str())
    }

    /// Id of the category called `name`, ignoring case.
    pub fn id_of(&self, name: &str) -> Option<u64> {
        let name = name.trim();

        self.categories
            .iter()
            .find(|category| category.name.eq_ignore_ascii_case(name))
            .map(|category| category.id)
    }

    /// All categories in API order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> + '_ {
        self.categories.iter()
    }

    /// Check if no categories are known.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
