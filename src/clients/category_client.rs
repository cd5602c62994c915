use tokio::sync::mpsc;

use crate::domain::Category;
use crate::messages::CategoryRequest;
use crate::stream_framework::Replay;

#[derive(Clone)]
struct CategoryStreams {
    categories: Replay<Vec<Category>>,
}

/// Client for the category service.
#[derive(Clone)]
pub struct CategoryClient {
    sender: mpsc::Sender<CategoryRequest>,
    streams: CategoryStreams,
}

impl CategoryClient {
    pub fn new(sender: mpsc::Sender<CategoryRequest>, categories: Replay<Vec<Category>>) -> Self {
        Self {
            sender,
            streams: CategoryStreams { categories },
        }
    }
}

impl_stream_accessors!(CategoryClient {
    /// Shared category collection. Never fails; a failed fetch shows up as an
    /// empty collection.
    categories: Vec<Category>,
});

impl_client_commands!(CategoryClient =>
    fn refresh() as CategoryRequest::Refresh,
    fn shutdown() as CategoryRequest::Shutdown,
);
