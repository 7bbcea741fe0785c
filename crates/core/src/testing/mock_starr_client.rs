use crate::starr::{QueueFetch, QueueItem, StarrApp, StarrClient, StarrError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// One recorded call to `delete_download`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDeletion {
    pub id: String,
    pub remove_from_client: bool,
}

/// In-memory Starr client for tests.
///
/// Serves a scripted queue, records deletions and supports error injection.
/// A successful deletion drops the item from the scripted queue like a real
/// backend would.
#[derive(Clone)]
pub struct MockStarrClient {
    app: StarrApp,
    queue: Arc<RwLock<Vec<QueueItem>>>,
    deletions: Arc<RwLock<Vec<RecordedDeletion>>>,
    fetch_count: Arc<RwLock<u32>>,
    next_fetch_error: Arc<RwLock<Option<StarrError>>>,
    fail_deletes: Arc<RwLock<bool>>,
}

impl MockStarrClient {
    pub fn new(app: StarrApp) -> Self {
        Self {
            app,
            queue: Arc::new(RwLock::new(Vec::new())),
            deletions: Arc::new(RwLock::new(Vec::new())),
            fetch_count: Arc::new(RwLock::new(0)),
            next_fetch_error: Arc::new(RwLock::new(None)),
            fail_deletes: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn set_queue(&self, items: Vec<QueueItem>) {
        *self.queue.write().await = items;
    }

    pub async fn deletions(&self) -> Vec<RecordedDeletion> {
        self.deletions.read().await.clone()
    }

    pub async fn fetch_count(&self) -> u32 {
        *self.fetch_count.read().await
    }

    /// The next `fetch_queue` call returns this error with an empty queue.
    pub async fn set_next_fetch_error(&self, error: StarrError) {
        *self.next_fetch_error.write().await = Some(error);
    }

    /// While set, every `delete_download` call fails.
    pub async fn set_fail_deletes(&self, fail: bool) {
        *self.fail_deletes.write().await = fail;
    }
}

#[async_trait]
impl StarrClient for MockStarrClient {
    fn app(&self) -> StarrApp {
        self.app
    }

    async fn fetch_queue(&self) -> QueueFetch {
        *self.fetch_count.write().await += 1;
        if let Some(error) = self.next_fetch_error.write().await.take() {
            return QueueFetch {
                items: Vec::new(),
                api_calls: 1,
                error: Some(error),
            };
        }
        QueueFetch {
            items: self.queue.read().await.clone(),
            api_calls: 1,
            error: None,
        }
    }

    async fn delete_download(&self, id: &str, remove_from_client: bool) -> Result<(), StarrError> {
        if *self.fail_deletes.read().await {
            return Err(StarrError::ConnectionFailed(
                "injected delete failure".to_string(),
            ));
        }
        self.deletions.write().await.push(RecordedDeletion {
            id: id.to_string(),
            remove_from_client,
        });
        self.queue.write().await.retain(|item| item.id != id);
        Ok(())
    }
}
