use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

use crate::app_system::CatalogConfig;
use crate::data_source::DataSource;
use crate::domain::{Category, Product, Supplier, SupplierId};
use crate::error::CatalogError;

/// REST backend for products, categories and suppliers.
pub struct HttpDataSource {
    client: Client,
    base_url: Url,
    products_path: String,
    categories_path: String,
    suppliers_path: String,
    timeout: Duration,
}

impl HttpDataSource {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|e| CatalogError::Network(format!("invalid base url {}: {}", config.base_url, e)))?;
        // Resource paths are joined onto the base, which must end in a slash
        // or its last segment is replaced.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
            debug!(%base_url, "Appended trailing slash to base url");
        }
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            products_path: config.products_path.clone(),
            categories_path: config.categories_path.clone(),
            suppliers_path: config.suppliers_path.trim_end_matches('/').to_string(),
            timeout: config.request_timeout(),
        })
    }

    #[instrument(skip(self))]
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| CatalogError::Network(format!("invalid path {}: {}", path, e)))?;
        debug!(%url, "Sending request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            error!(status = status.as_u16(), %message, "Backend returned an error");
            return Err(CatalogError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                error!(error = %e, "Response body could not be decoded");
                CatalogError::Decode(e.to_string())
            } else {
                self.request_error(e)
            }
        })
    }

    fn request_error(&self, e: reqwest::Error) -> CatalogError {
        error!(error = %e, "Request failed");
        if e.is_timeout() {
            CatalogError::Timeout(self.timeout)
        } else {
            CatalogError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.get_json(&self.products_path).await
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.get_json(&self.categories_path).await
    }

    async fn fetch_supplier(&self, id: SupplierId) -> Result<Supplier, CatalogError> {
        self.get_json(&format!("{}/{}", self.suppliers_path, id)).await
    }
}
