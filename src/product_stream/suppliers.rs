use std::sync::Arc;

use futures::future::{BoxFuture, OptionFuture};
use futures::{stream, FutureExt, StreamExt, TryStreamExt};
use tracing::{debug, error, info};

use crate::data_source::DataSource;
use crate::domain::{Product, Supplier, SupplierId};
use crate::error::CatalogError;
use crate::stream_framework::{when_demanded, Replay};

/// Fetches every supplier concurrently, at most `limit` at a time, and returns
/// them as one batch. Completion order is not preserved. The first failure
/// fails the whole batch.
pub async fn fetch_suppliers(
    source: Arc<dyn DataSource>,
    ids: Vec<SupplierId>,
    limit: usize,
) -> Result<Vec<Supplier>, CatalogError> {
    stream::iter(ids)
        .map(|id| {
            let source = Arc::clone(&source);
            async move { source.fetch_supplier(id).await }
        })
        .buffer_unordered(limit.max(1))
        .try_collect()
        .await
}

/// Suppliers of the currently selected product.
///
/// `None` selections are skipped. A newer selection drops the fan-out still in
/// flight for the previous one, so a stale batch is never published. The
/// selection arm is polled first: a batch that finishes in the same poll as a
/// newer selection is discarded.
pub async fn selected_product_suppliers(
    selected: Replay<Option<Product>>,
    source: Arc<dyn DataSource>,
    output: Replay<Vec<Supplier>>,
    limit: usize,
) {
    when_demanded(output, |output| async move {
        let mut selected = selected.subscribe();
        let mut selected_open = true;
        let mut in_flight: Option<BoxFuture<'static, Result<Vec<Supplier>, CatalogError>>> = None;

        loop {
            tokio::select! {
                biased;

                item = selected.next(), if selected_open => match item {
                    Some(Ok(Some(product))) => {
                        if in_flight.is_some() {
                            debug!("Superseding in-flight supplier fetch");
                        }
                        let ids = product.supplier_ids().to_vec();
                        debug!(product_id = product.id, supplier_count = ids.len(), "Fetching suppliers");
                        in_flight = Some(fetch_suppliers(Arc::clone(&source), ids, limit).boxed());
                    }
                    Some(Ok(None)) => {}
                    Some(Err(e)) => return Err(e),
                    None => {
                        selected_open = false;
                        if in_flight.is_none() {
                            output.complete();
                            return Ok(());
                        }
                    }
                },
                Some(batch) = OptionFuture::from(in_flight.as_mut()), if in_flight.is_some() => {
                    in_flight = None;
                    match batch {
                        Ok(suppliers) => {
                            info!(supplier_count = suppliers.len(), "Suppliers loaded");
                            output.publish(suppliers);
                        }
                        Err(e) => {
                            error!(error = %e, "Supplier fetch failed");
                            return Err(e);
                        }
                    }
                    if !selected_open {
                        output.complete();
                        return Ok(());
                    }
                }
            }
        }
    })
    .await
}
