//! Data source abstraction for the catalog backend.
//!
//! [`DataSource`] is the single seam between the stream providers and the
//! network. [`HttpDataSource`] talks to the REST backend; tests substitute the
//! channel-driven mock from `mock_framework`.
pub mod http;

use async_trait::async_trait;

use crate::domain::{Category, Product, SupplierId, Supplier};
use crate::error::CatalogError;

pub use http::HttpDataSource;

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Raw backend products, before price adjustment.
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError>;

    async fn fetch_categories(&self) -> Result<Vec<Category>, CatalogError>;

    async fn fetch_supplier(&self, id: SupplierId) -> Result<Supplier, CatalogError>;
}
