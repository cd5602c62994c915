use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::clients::CategoryClient;
use crate::data_source::DataSource;
use crate::domain::Category;
use crate::messages::CategoryRequest;
use crate::stream_framework::Replay;

/// Owns the shared category stream.
///
/// The first fetch waits for the first subscriber. Fetch failures are
/// recovered here: subscribers get an empty collection and the stream stays
/// open for later refreshes.
pub struct CategoryService {
    receiver: mpsc::Receiver<CategoryRequest>,
    source: Arc<dyn DataSource>,
    categories: Replay<Vec<Category>>,
    loaded: bool,
}

impl CategoryService {
    pub fn new(buffer_size: usize, source: Arc<dyn DataSource>) -> (Self, CategoryClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let categories = Replay::new();
        let service = Self {
            receiver,
            source,
            categories: categories.clone(),
            loaded: false,
        };
        let client = CategoryClient::new(sender, categories);
        (service, client)
    }

    #[instrument(name = "category_service", skip(self))]
    pub async fn run(mut self) {
        info!("CategoryService starting");

        loop {
            tokio::select! {
                _ = self.categories.demanded(), if !self.loaded => {
                    self.load().await;
                }
                msg = self.receiver.recv() => match msg {
                    Some(CategoryRequest::Refresh) => {
                        self.load().await;
                    }
                    Some(CategoryRequest::Shutdown) | None => {
                        info!("CategoryService shutting down");
                        break;
                    }
                },
            }
        }

        self.categories.complete();
        info!("CategoryService stopped");
    }

    /// One fetch at a time: refreshes queue behind the one in flight.
    #[instrument(skip(self))]
    async fn load(&mut self) {
        debug!("Fetching categories");
        self.loaded = true;

        let categories = match self.source.fetch_categories().await {
            Ok(categories) => {
                info!(category_count = categories.len(), "Categories loaded");
                categories
            }
            Err(e) => {
                warn!(error = %e, "Category fetch failed, publishing empty collection");
                Vec::new()
            }
        };

        self.categories.publish(categories);
    }
}
