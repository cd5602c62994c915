//! # Mock Framework
//!
//! Utilities for testing stream providers without a backend.
//!
//! Use [`create_mock_source`] to get a data source and a receiver. Every fetch
//! the providers issue arrives on the receiver together with a responder, so a
//! test decides when and how each request completes. Helpers like
//! [`expect_products`] or [`expect_supplier`] assert the shape of the next request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::data_source::DataSource;
use crate::domain::{Category, Product, Supplier, SupplierId};
use crate::error::CatalogError;

pub type Responder<T> = oneshot::Sender<Result<T, CatalogError>>;

/// A fetch issued through [`MockDataSource`].
#[derive(Debug)]
pub enum SourceRequest {
    Products { respond_to: Responder<Vec<Product>> },
    Categories { respond_to: Responder<Vec<Category>> },
    Supplier { id: SupplierId, respond_to: Responder<Supplier> },
}

pub struct MockDataSource {
    sender: mpsc::Sender<SourceRequest>,
}

impl MockDataSource {
    async fn request<T>(
        &self,
        build: impl FnOnce(Responder<T>) -> SourceRequest,
    ) -> Result<T, CatalogError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| CatalogError::ServiceClosed("mock receiver dropped".to_string()))?;
        response
            .await
            .map_err(|_| CatalogError::ServiceClosed("mock responder dropped".to_string()))?
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.request(|respond_to| SourceRequest::Products { respond_to }).await
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.request(|respond_to| SourceRequest::Categories { respond_to }).await
    }

    async fn fetch_supplier(&self, id: SupplierId) -> Result<Supplier, CatalogError> {
        self.request(|respond_to| SourceRequest::Supplier { id, respond_to }).await
    }
}

/// Creates a mock data source and a receiver for asserting requests.
pub fn create_mock_source(buffer_size: usize) -> (Arc<MockDataSource>, mpsc::Receiver<SourceRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (Arc::new(MockDataSource { sender }), receiver)
}

/// Helper to verify that the next request is a product fetch
pub async fn expect_products(receiver: &mut mpsc::Receiver<SourceRequest>) -> Option<Responder<Vec<Product>>> {
    match receiver.recv().await {
        Some(SourceRequest::Products { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next request is a category fetch
pub async fn expect_categories(receiver: &mut mpsc::Receiver<SourceRequest>) -> Option<Responder<Vec<Category>>> {
    match receiver.recv().await {
        Some(SourceRequest::Categories { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next request is a supplier fetch
pub async fn expect_supplier(receiver: &mut mpsc::Receiver<SourceRequest>) -> Option<(SupplierId, Responder<Supplier>)> {
    match receiver.recv().await {
        Some(SourceRequest::Supplier { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Answers the initial product and category fetches, in whichever order the
/// providers issue them.
pub async fn serve_catalog(
    receiver: &mut mpsc::Receiver<SourceRequest>,
    products: Result<Vec<Product>, CatalogError>,
    categories: Result<Vec<Category>, CatalogError>,
) {
    let mut products = Some(products);
    let mut categories = Some(categories);
    while products.is_some() || categories.is_some() {
        match receiver.recv().await {
            Some(SourceRequest::Products { respond_to }) => {
                let reply = products.take().expect("products fetched twice");
                let _ = respond_to.send(reply);
            }
            Some(SourceRequest::Categories { respond_to }) => {
                let reply = categories.take().expect("categories fetched twice");
                let _ = respond_to.send(reply);
            }
            other => panic!("Unexpected request: {:?}", other),
        }
    }
}

/// Asserts that no request arrives within `wait`.
pub async fn expect_idle(receiver: &mut mpsc::Receiver<SourceRequest>, wait: Duration) {
    if let Ok(Some(request)) = tokio::time::timeout(wait, receiver.recv()).await {
        panic!("Unexpected request: {:?}", request);
    }
}

/// Backend products as the fixtures used throughout the tests.
pub fn sample_products() -> Vec<Product> {
    vec![
        Product::new(1, "Leaf Rake", 19.95, 1).with_suppliers(vec![1, 2]),
        Product::new(2, "Garden Cart", 32.99, 1).with_suppliers(vec![3, 4]),
        Product::new(5, "Hammer", 8.9, 3).with_suppliers(vec![5, 6]),
        Product::new(8, "Saw", 11.55, 3),
        Product::new(10, "Video Game Controller", 35.95, 5).with_suppliers(vec![]),
    ]
}

pub fn sample_categories() -> Vec<Category> {
    vec![
        Category::new(1, "Garden"),
        Category::new(3, "Toolbox"),
        Category::new(5, "Gaming"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_source() {
        let (source, mut receiver) = create_mock_source(10);

        let fetch_task = tokio::spawn(async move { source.fetch_supplier(3).await });

        let (id, responder) = expect_supplier(&mut receiver).await.expect("Expected Supplier request");
        assert_eq!(id, 3);
        responder.send(Ok(Supplier::new(3, "Acme"))).unwrap();

        let result = fetch_task.await.unwrap();
        assert_eq!(result, Ok(Supplier::new(3, "Acme")));
    }

    #[tokio::test]
    async fn test_dropped_responder_is_an_error() {
        let (source, mut receiver) = create_mock_source(10);

        let fetch_task = tokio::spawn(async move { source.fetch_categories().await });

        drop(expect_categories(&mut receiver).await.expect("Expected Categories request"));

        let result = fetch_task.await.unwrap();
        assert!(matches!(result, Err(CatalogError::ServiceClosed(_))));
    }
}
