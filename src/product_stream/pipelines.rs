use std::sync::Arc;

use tracing::{debug, error, info, warn, Instrument};

use crate::app_system::JoinPolicy;
use crate::clients::CategoryClient;
use crate::data_source::DataSource;
use crate::domain::{Category, Product, ProductId};
use crate::error::CatalogError;
use crate::stream_framework::{combine_latest, when_demanded, Replay, Subscription};

/// Cold base product stream: every call issues its own fetch, emits the
/// price-adjusted products once and completes.
///
/// A fetch failure ends this subscription with the error. Unlike categories,
/// product failures are not recovered.
pub fn product_feed(source: Arc<dyn DataSource>) -> Subscription<Vec<Product>> {
    let feed = Replay::new();
    let subscription = feed.subscribe();

    tokio::spawn(
        async move {
            debug!("Fetching products");
            match source.fetch_products().await {
                Ok(products) => {
                    info!(product_count = products.len(), "Products loaded");
                    feed.publish(products.into_iter().map(Product::ingest).collect());
                    feed.complete();
                }
                Err(e) => {
                    error!(error = %e, "Product fetch failed");
                    feed.fail(e);
                }
            }
        }
        .in_current_span(),
    );

    subscription
}

/// Re-derives the category name of every product from `categories`.
///
/// Prices are left alone; they were adjusted once by [`Product::ingest`].
pub fn join_categories(
    products: &[Product],
    categories: &[Category],
    policy: JoinPolicy,
) -> Result<Vec<Product>, CatalogError> {
    products
        .iter()
        .map(|product| {
            let category = categories.iter().find(|c| c.id == product.category_id);
            match (category, policy) {
                (Some(category), _) => Ok(Product {
                    category: Some(category.name.clone()),
                    ..product.clone()
                }),
                (None, JoinPolicy::TagUnmatched) => {
                    warn!(product_id = product.id, category_id = product.category_id, "No matching category");
                    Ok(Product {
                        category: None,
                        ..product.clone()
                    })
                }
                (None, JoinPolicy::FailBatch) => Err(CatalogError::CategoryNotFound {
                    product_id: product.id,
                    category_id: product.category_id,
                }),
            }
        })
        .collect()
}

/// Combined-latest of one base product fetch and the category stream.
pub async fn products_with_category(
    source: Arc<dyn DataSource>,
    categories: CategoryClient,
    output: Replay<Vec<Product>>,
    policy: JoinPolicy,
) {
    when_demanded(output, |output| async move {
        debug!("Joining products with categories");
        let result = combine_latest(product_feed(source), categories.categories(), &output, |products, categories| {
            join_categories(products, categories, policy)
        })
        .await;
        if let Err(e) = &result {
            error!(error = %e, "Product/category join failed");
        }
        result
    })
    .await
}

/// Combined-latest of the joined products and the selected id cell.
///
/// Emits `None` when no product has the selected id, including the initial
/// 0 selection.
pub async fn selected_product(
    products: Replay<Vec<Product>>,
    selected_id: Replay<ProductId>,
    output: Replay<Option<Product>>,
) {
    when_demanded(output, |output| async move {
        combine_latest(products.subscribe(), selected_id.subscribe(), &output, |products, id| {
            let product = products.iter().find(|p| p.id == *id).cloned();
            debug!(selected_id = id, found = product.is_some(), "Selected product");
            Ok(product)
        })
        .await
    })
    .await
}
