use std::time::Duration;

use thiserror::Error;

use crate::domain::{CategoryId, ProductId};

/// Errors carried by catalog streams.
///
/// Streams replay their terminal error to every subscriber, so the error must be
/// cheap to clone and carries rendered messages rather than source errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("An error occurred: {0}")]
    Network(String),
    #[error("Backend returned code {status}: {message}")]
    Backend { status: u16, message: String },
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("No category with id {category_id} for product {product_id}")]
    CategoryNotFound {
        product_id: ProductId,
        category_id: CategoryId,
    },
    #[error("Service closed: {0}")]
    ServiceClosed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}
