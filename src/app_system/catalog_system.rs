use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::app_system::CatalogConfig;
use crate::category_stream::CategoryService;
use crate::clients::{CategoryClient, ProductClient};
use crate::data_source::DataSource;
use crate::presenter::ProductListPresenter;
use crate::product_stream::ProductService;

/// Starts the stream providers, wires them together and shuts them down.
///
/// Each system owns its own services and cells; independent systems share
/// nothing.
pub struct CatalogSystem {
    pub category_client: CategoryClient,
    pub product_client: ProductClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl CatalogSystem {
    /// Categories start first since the product service depends on them.
    #[instrument(name = "catalog_system", skip_all)]
    pub fn new(config: &CatalogConfig, source: Arc<dyn DataSource>) -> Self {
        let mut handles = Vec::new();

        info!("Starting catalog system");

        let (category_service, category_client) =
            CategoryService::new(config.channel_buffer, Arc::clone(&source));
        handles.push(tokio::spawn(category_service.run()));

        let (product_service, product_client) =
            ProductService::new(config, source, category_client.clone());
        handles.push(tokio::spawn(product_service.run()));

        info!("Catalog system started");

        Self {
            category_client,
            product_client,
            handles,
        }
    }

    /// A new product list view over this system's streams.
    pub fn product_list(&self) -> ProductListPresenter {
        ProductListPresenter::new(self.product_client.clone(), self.category_client.clone())
    }

    /// Products shut down before categories since they consume them.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down catalog system");

        if let Err(e) = self.product_client.shutdown() {
            warn!(error = %e, "Product service already stopped");
        }
        if let Err(e) = self.category_client.shutdown().await {
            warn!(error = %e, "Category service already stopped");
        }

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Service shutdown error");
                return Err(format!("Service task failed: {:?}", e));
            }
        }

        info!("Catalog system shutdown complete");
        Ok(())
    }
}
