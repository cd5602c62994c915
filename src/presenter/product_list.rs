use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, Instrument};

use crate::clients::{CategoryClient, ProductClient};
use crate::domain::{Category, CategoryId, Product};
use crate::stream_framework::{combine_latest, Replay, Subscription};

pub const PAGE_TITLE: &str = "Product List";

/// Filtered product list backing the catalog page.
///
/// Any failure of the product composition is written to [`error_message`]
/// before the view fails. A failed view stays failed; build a new presenter
/// over a new system to recover.
///
/// [`error_message`]: ProductListPresenter::error_message
pub struct ProductListPresenter {
    pub page_title: &'static str,
    error_message: Arc<Mutex<String>>,
    category_selected: Replay<CategoryId>,
    products: Replay<Vec<Product>>,
    categories: Replay<Vec<Category>>,
    product_client: ProductClient,
    handles: Vec<JoinHandle<()>>,
}

impl ProductListPresenter {
    #[instrument(name = "product_list", skip_all)]
    pub fn new(product_client: ProductClient, category_client: CategoryClient) -> Self {
        let error_message = Arc::new(Mutex::new(String::new()));
        let category_selected = Replay::with_value(0);
        let products = Replay::new();
        let categories = Replay::new();

        let handles = vec![
            tokio::spawn(
                filtered_products(
                    product_client.clone(),
                    category_selected.clone(),
                    products.clone(),
                    Arc::clone(&error_message),
                )
                .in_current_span(),
            ),
            tokio::spawn(
                forward_categories(category_client, categories.clone(), Arc::clone(&error_message))
                    .in_current_span(),
            ),
        ];

        Self {
            page_title: PAGE_TITLE,
            error_message,
            category_selected,
            products,
            categories,
            product_client,
            handles,
        }
    }

    /// Products filtered by the selected category; 0 means no filter.
    pub fn products(&self) -> Subscription<Vec<Product>> {
        self.products.subscribe()
    }

    pub fn categories(&self) -> Subscription<Vec<Category>> {
        self.categories.subscribe()
    }

    #[instrument(skip(self))]
    pub fn select_category(&self, category_id: CategoryId) {
        debug!("Category selected");
        self.category_selected.publish(category_id);
    }

    pub fn selected_category(&self) -> CategoryId {
        self.category_selected.latest().unwrap_or(0)
    }

    /// Adds the fallback product.
    pub fn add_product(&self) {
        self.product_client.add_product(None);
    }

    pub fn error_message(&self) -> String {
        self.error_message.lock().clone()
    }
}

impl Drop for ProductListPresenter {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

fn filter_by_category(products: &[Product], category_id: CategoryId) -> Vec<Product> {
    products
        .iter()
        .filter(|product| category_id == 0 || product.category_id == category_id)
        .cloned()
        .collect()
}

async fn filtered_products(
    product_client: ProductClient,
    category_selected: Replay<CategoryId>,
    output: Replay<Vec<Product>>,
    error_message: Arc<Mutex<String>>,
) {
    output.demanded().await;
    let result = combine_latest(
        product_client.products_with_category(),
        category_selected.subscribe(),
        &output,
        |products, category_id| {
            let filtered = filter_by_category(products, *category_id);
            debug!(category_id, shown = filtered.len(), "Product list filtered");
            Ok(filtered)
        },
    )
    .await;

    if let Err(e) = result {
        error!(error = %e, "Product list failed");
        *error_message.lock() = e.to_string();
        output.fail(e);
    }
}

/// Categories for the filter drop-down. An error is written to the message
/// field and ends the stream quietly.
///
/// `CategoryService` recovers its own fetch failures, so the error arm only
/// runs for a category stream that was failed outside the service.
async fn forward_categories(
    category_client: CategoryClient,
    output: Replay<Vec<Category>>,
    error_message: Arc<Mutex<String>>,
) {
    output.demanded().await;
    let mut categories = category_client.categories();
    loop {
        match categories.next().await {
            Some(Ok(list)) => {
                info!(category_count = list.len(), "Categories available for filtering");
                output.publish(list);
            }
            Some(Err(e)) => {
                error!(error = %e, "Category list failed");
                *error_message.lock() = e.to_string();
                output.complete();
                return;
            }
            None => {
                output.complete();
                return;
            }
        }
    }
}
