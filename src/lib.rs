//! # catalog-streams
//!
//! Reactive product catalog: products, categories and suppliers fetched over
//! HTTP and composed into live, shared streams.
//!
//! - [`category_stream::CategoryService`] publishes the category collection and
//!   recovers from fetch failures with an empty collection.
//! - [`product_stream::ProductService`] joins products with categories, tracks
//!   the selected product and its suppliers, and folds in inserted products.
//! - [`presenter::ProductListPresenter`] filters the joined products by category
//!   and surfaces failures as a message.
//! - [`app_system::CatalogSystem`] starts, wires and shuts down the services.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use catalog_streams::app_system::{CatalogConfig, CatalogSystem};
//! # use catalog_streams::data_source::HttpDataSource;
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CatalogConfig::load(None)?;
//! let system = CatalogSystem::new(&config, Arc::new(HttpDataSource::new(&config)?));
//!
//! let product_list = system.product_list();
//! product_list.select_category(3);
//! let mut products = product_list.products();
//! if let Some(Ok(products)) = products.next().await {
//!     println!("{} products", products.len());
//! }
//!
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod app_system;
pub mod category_stream;
pub mod clients;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod messages;
pub mod presenter;
pub mod product_stream;
pub mod stream_framework;

#[cfg(test)]
mod mock_framework;
