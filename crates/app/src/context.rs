//! App Context

use std::{path::PathBuf, sync::Arc};

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use storefront::{
    catalog::{Catalog, Categories},
    pricing::{PricingError, currency_from_code},
    storage::{FileStore, KeyValueStore},
    store::CartStore,
    submission::{LocalOrderLog, OrderSubmitter},
};
use thiserror::Error;
use tracing::debug;

use crate::{
    api::{ApiClient, ApiError, HttpOrderSubmitter},
    config::{AppConfig, SubmissionMode},
};

/// Errors raised while assembling the application context.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// The HTTP client could not be built.
    #[error("failed to build API client")]
    Api(#[source] ApiError),

    /// The configured currency code is not supported.
    #[error("unsupported display currency")]
    Currency(#[source] PricingError),
}

/// Errors raised while loading the product catalog.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    /// The catalog fixture file could not be read.
    #[error("failed to read catalog file {}", path.display())]
    File {
        /// Fixture path
        path: PathBuf,

        /// Underlying decode error
        #[source]
        source: storefront::catalog::CatalogError,
    },

    /// The API request failed.
    #[error("failed to fetch catalog")]
    Api(#[source] ApiError),
}

/// Shared services for one command invocation.
#[derive(Clone)]
pub struct AppContext {
    /// Session storage backing the cart and the local order log.
    pub storage: Arc<dyn KeyValueStore>,

    /// Where checkout sends orders.
    pub submitter: Arc<dyn OrderSubmitter>,

    /// Display currency.
    pub currency: &'static Currency,

    /// Flat fee added to each order.
    pub delivery_fee: Decimal,

    api: ApiClient,
    catalog_file: Option<PathBuf>,
}

impl AppContext {
    /// Build application context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built or the currency is unknown.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let storage: Arc<dyn KeyValueStore> =
            Arc::new(FileStore::new(config.storage.data_dir.clone()));

        let api = ApiClient::new(&config.api).map_err(AppInitError::Api)?;

        let submitter: Arc<dyn OrderSubmitter> = match config.checkout.submission {
            SubmissionMode::Remote => Arc::new(HttpOrderSubmitter::new(api.clone())),
            SubmissionMode::Local => Arc::new(LocalOrderLog::new(Arc::clone(&storage))),
        };

        let currency =
            currency_from_code(&config.checkout.currency).map_err(AppInitError::Currency)?;

        debug!(
            data_dir = %config.storage.data_dir.display(),
            submission = ?config.checkout.submission,
            "app context ready"
        );

        Ok(Self {
            storage,
            submitter,
            currency,
            delivery_fee: config.checkout.delivery_fee,
            api,
            catalog_file: config.storage.catalog_file.clone(),
        })
    }

    /// Rehydrate the session cart from storage.
    #[must_use]
    pub fn cart_store(&self) -> CartStore {
        CartStore::initialize(Arc::clone(&self.storage)).with_delivery_fee(self.delivery_fee)
    }

    /// Local order history, kept alongside the cart.
    #[must_use]
    pub fn order_log(&self) -> LocalOrderLog {
        LocalOrderLog::new(Arc::clone(&self.storage))
    }

    /// Load the catalog from the configured file, or from the API otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error when the catalog file or the API response cannot be read.
    pub async fn catalog(&self) -> Result<Catalog, CatalogLoadError> {
        match &self.catalog_file {
            Some(path) => Catalog::from_file(path).map_err(|source| CatalogLoadError::File {
                path: path.clone(),
                source,
            }),
            None => self.api.fetch_catalog().await.map_err(CatalogLoadError::Api),
        }
    }

    /// Load category names from the catalog file, or from the API otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error when the catalog file or the API response cannot be read.
    pub async fn categories(&self) -> Result<Categories, CatalogLoadError> {
        match &self.catalog_file {
            Some(path) => Categories::from_file(path).map_err(|source| CatalogLoadError::File {
                path: path.clone(),
                source,
            }),
            None => self
                .api
                .fetch_categories()
                .await
                .map_err(CatalogLoadError::Api),
        }
    }
}
