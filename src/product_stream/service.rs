use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, Instrument};

use crate::app_system::{CatalogConfig, JoinPolicy};
use crate::clients::{CategoryClient, ProductClient, ProductStreams};
use crate::data_source::DataSource;
use crate::domain::{Product, ProductId};
use crate::messages::ProductRequest;
use crate::stream_framework::{next_from, Replay, Subscription};

use super::pipelines::{products_with_category, selected_product};
use super::suppliers::selected_product_suppliers;

/// Owns every product stream.
///
/// The derived streams run as child pipelines; the service loop itself folds
/// inserted products into the running `products_with_add` list.
pub struct ProductService {
    receiver: mpsc::UnboundedReceiver<ProductRequest>,
    source: Arc<dyn DataSource>,
    category_client: CategoryClient,
    streams: ProductStreams,
    selected_id: Replay<ProductId>,
    join_policy: JoinPolicy,
    supplier_concurrency: usize,
    base: Option<Vec<Product>>,
    inserted: Vec<Product>,
}

impl ProductService {
    pub fn new(
        config: &CatalogConfig,
        source: Arc<dyn DataSource>,
        category_client: CategoryClient,
    ) -> (Self, ProductClient) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let streams = ProductStreams::default();
        let selected_id = Replay::with_value(0);

        let service = Self {
            receiver,
            source: Arc::clone(&source),
            category_client,
            streams: streams.clone(),
            selected_id: selected_id.clone(),
            join_policy: config.join_policy,
            supplier_concurrency: config.supplier_concurrency,
            base: None,
            inserted: Vec::new(),
        };
        let client = ProductClient::new(sender, source, streams, selected_id);
        (service, client)
    }

    #[instrument(name = "product_service", skip(self))]
    pub async fn run(mut self) {
        info!("ProductService starting");

        let mut pipelines = JoinSet::new();
        pipelines.spawn(
            products_with_category(
                Arc::clone(&self.source),
                self.category_client.clone(),
                self.streams.products_with_category.clone(),
                self.join_policy,
            )
            .in_current_span(),
        );
        pipelines.spawn(
            selected_product(
                self.streams.products_with_category.clone(),
                self.selected_id.clone(),
                self.streams.selected_product.clone(),
            )
            .in_current_span(),
        );
        pipelines.spawn(
            selected_product_suppliers(
                self.streams.selected_product.clone(),
                Arc::clone(&self.source),
                self.streams.selected_product_suppliers.clone(),
                self.supplier_concurrency,
            )
            .in_current_span(),
        );

        let mut upstream: Option<Subscription<Vec<Product>>> = None;
        let mut upstream_done = false;

        loop {
            tokio::select! {
                msg = self.receiver.recv() => match msg {
                    Some(ProductRequest::Insert(product)) => {
                        self.handle_insert(product);
                    }
                    Some(ProductRequest::Shutdown) | None => {
                        info!("ProductService shutting down");
                        break;
                    }
                },
                _ = self.streams.products_with_add.demanded(), if upstream.is_none() && !upstream_done => {
                    debug!("Products with additions requested");
                    upstream = Some(self.streams.products_with_category.subscribe());
                }
                item = next_from(&mut upstream), if upstream.is_some() => match item {
                    Some(Ok(products)) => {
                        self.base = Some(products);
                        self.publish_with_add();
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "Products with additions failed");
                        self.streams.products_with_add.fail(e);
                        upstream = None;
                        upstream_done = true;
                    }
                    None => {
                        self.streams.products_with_add.complete();
                        upstream = None;
                        upstream_done = true;
                    }
                },
            }
        }

        pipelines.abort_all();
        while pipelines.join_next().await.is_some() {}

        self.streams.complete_all();
        self.selected_id.complete();
        info!("ProductService stopped");
    }

    #[instrument(fields(product_id = product.id), skip(self, product))]
    fn handle_insert(&mut self, product: Product) {
        self.inserted.push(product);
        info!(inserted_count = self.inserted.len(), "Product inserted");
        self.publish_with_add();
    }

    /// Latest joined list followed by every insertion so far. Nothing is
    /// published until the joined list has arrived.
    fn publish_with_add(&self) {
        if let Some(base) = &self.base {
            let mut products = Vec::with_capacity(base.len() + self.inserted.len());
            products.extend_from_slice(base);
            products.extend_from_slice(&self.inserted);
            self.streams.products_with_add.publish(products);
        }
    }
}
