use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn, Instrument};

use catalog_streams::app_system::{setup_tracing, CatalogConfig, CatalogSystem};
use catalog_streams::data_source::HttpDataSource;
use catalog_streams::domain::{CategoryId, ProductId};

/// Loads the product catalog and prints the filtered list and the suppliers
/// of one product.
#[derive(Debug, Parser)]
#[command(name = "catalog", version)]
struct Args {
    /// TOML config file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Category to filter by; 0 shows every product.
    #[arg(long, default_value_t = 0)]
    category: CategoryId,

    /// Product whose suppliers should be fetched.
    #[arg(long)]
    product: Option<ProductId>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();
    let args = Args::parse();

    let config = CatalogConfig::load(args.config.as_deref()).map_err(|e| e.to_string())?;
    info!(base_url = %config.base_url, "Starting catalog");

    let source = HttpDataSource::new(&config).map_err(|e| e.to_string())?;
    let system = CatalogSystem::new(&config, Arc::new(source));
    let product_list = system.product_list();

    let span = tracing::info_span!("product_list", category = args.category);
    async {
        product_list.select_category(args.category);
        let mut products = product_list.products();
        match products.next().await {
            Some(Ok(products)) => {
                for product in &products {
                    info!(
                        id = product.id,
                        name = %product.product_name,
                        category = %product.category_label(),
                        price = product.price,
                        "Product"
                    );
                }
            }
            Some(Err(e)) => error!(error = %e, "Product list unavailable"),
            None => warn!("Product list closed"),
        }
    }
    .instrument(span)
    .await;

    if let Some(product_id) = args.product {
        let span = tracing::info_span!("suppliers", product_id);
        async {
            // Selecting before subscribing makes the first emission reflect this id
            system.product_client.select_product(product_id);
            let mut selected = system.product_client.selected_product();

            match selected.next().await {
                Some(Ok(Some(product))) => info!(name = %product.product_name, "Product selected"),
                Some(Ok(None)) => {
                    warn!("No product with this id");
                    return;
                }
                Some(Err(e)) => {
                    error!(error = %e, "Selection unavailable");
                    return;
                }
                None => return,
            }

            let mut suppliers = system.product_client.selected_product_suppliers();
            match suppliers.next().await {
                Some(Ok(suppliers)) => {
                    for supplier in suppliers {
                        info!(id = supplier.id, name = %supplier.name, cost = supplier.cost, "Supplier");
                    }
                }
                Some(Err(e)) => error!(error = %e, "Suppliers unavailable"),
                None => warn!("Supplier stream closed"),
            }
        }
        .instrument(span)
        .await;
    }

    let message = product_list.error_message();
    drop(product_list);
    system.shutdown().await?;

    if message.is_empty() {
        info!("Catalog completed successfully");
        Ok(())
    } else {
        Err(message)
    }
}
