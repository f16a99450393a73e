//! Storefront REST API client.

use std::time::Duration;

use reqwest::Client;
use storefront::catalog::{Catalog, CatalogError, Categories};
use thiserror::Error;
use tracing::debug;

use crate::config::ApiConfig;

mod orders;
#[cfg(test)]
mod stub;

pub use orders::{HttpOrderSubmitter, OrderPayload};

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-2xx response.
    #[error("unexpected response from storefront API: {0}")]
    UnexpectedResponse(String),

    /// The product or category list could not be decoded.
    #[error("invalid listing: {0}")]
    Catalog(#[from] CatalogError),
}

/// HTTP client for the storefront API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl ApiClient {
    /// Create a client from the API settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone().filter(|token| !token.is_empty()),
            http,
        })
    }

    /// Build the absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Bearer token, when one is configured.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Fetch the product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure, a non-2xx status, or an undecodable body.
    pub async fn fetch_catalog(&self) -> Result<Catalog, ApiError> {
        let body = self.get_text("products").await?;
        let catalog = Catalog::from_json_str(&body)?;

        debug!(products = catalog.len(), "catalog fetched");

        Ok(catalog)
    }

    /// Fetch the category list.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure, a non-2xx status, or an undecodable body.
    pub async fn fetch_categories(&self) -> Result<Categories, ApiError> {
        let body = self.get_text("categories").await?;

        Ok(Categories::from_json_str(&body)?)
    }

    async fn get_text(&self, path: &str) -> Result<String, ApiError> {
        let url = self.url(path);

        let mut request = self.http.get(&url).header("Accept", "application/json");

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(ApiError::UnexpectedResponse(format!(
                "{path} request failed with status {status}: {text}"
            )));
        }

        Ok(response.text().await?)
    }
}
