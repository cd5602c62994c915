use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

use crate::data_source::DataSource;
use crate::domain::{Product, ProductId, Supplier};
use crate::error::CatalogError;
use crate::messages::ProductRequest;
use crate::product_stream::product_feed;
use crate::stream_framework::{Replay, Subscription};

/// The hot streams owned by the product service.
#[derive(Clone, Default)]
pub struct ProductStreams {
    pub products_with_category: Replay<Vec<Product>>,
    pub selected_product: Replay<Option<Product>>,
    pub selected_product_suppliers: Replay<Vec<Supplier>>,
    pub products_with_add: Replay<Vec<Product>>,
}

impl ProductStreams {
    pub fn complete_all(&self) {
        self.products_with_category.complete();
        self.selected_product.complete();
        self.selected_product_suppliers.complete();
        self.products_with_add.complete();
    }
}

/// Client for the product service.
#[derive(Clone)]
pub struct ProductClient {
    sender: mpsc::UnboundedSender<ProductRequest>,
    source: Arc<dyn DataSource>,
    streams: ProductStreams,
    selected_id: Replay<ProductId>,
}

impl ProductClient {
    pub fn new(
        sender: mpsc::UnboundedSender<ProductRequest>,
        source: Arc<dyn DataSource>,
        streams: ProductStreams,
        selected_id: Replay<ProductId>,
    ) -> Self {
        Self {
            sender,
            source,
            streams,
            selected_id,
        }
    }

    /// A fresh, unshared product fetch. Fails terminally if the fetch fails.
    #[instrument(skip(self))]
    pub fn products(&self) -> Subscription<Vec<Product>> {
        debug!("Subscribing to a fresh product fetch");
        product_feed(Arc::clone(&self.source))
    }

    /// Sets the selected product. The selection and supplier streams recompute.
    #[instrument(skip(self))]
    pub fn select_product(&self, id: ProductId) {
        debug!("Selecting product");
        self.selected_id.publish(id);
    }

    /// Pushes `product`, or the fallback record, onto the insertion stream.
    #[instrument(skip(self, product))]
    pub fn add_product(&self, product: Option<Product>) {
        let product = product.unwrap_or_else(Product::fallback);
        debug!(product_id = product.id, "Sending insert");
        if self.sender.send(ProductRequest::Insert(product)).is_err() {
            warn!("ProductService is gone, insert dropped");
        }
    }

    #[instrument(skip(self))]
    pub fn shutdown(&self) -> Result<(), CatalogError> {
        debug!("Sending request");
        self.sender
            .send(ProductRequest::Shutdown)
            .map_err(|_| CatalogError::ServiceClosed("ProductClient".to_string()))
    }
}

impl_stream_accessors!(ProductClient {
    /// Products with their category names, shared and replayed.
    products_with_category: Vec<Product>,
    /// The product matching the selected id, or `None`.
    selected_product: Option<Product>,
    /// Suppliers of the latest non-empty selection, as one batch.
    selected_product_suppliers: Vec<Supplier>,
    /// Joined products followed by every inserted product.
    products_with_add: Vec<Product>,
});
