//! Test doubles shared by unit and integration tests.

mod mock_starr_client;
mod static_settings;

pub use mock_starr_client::{MockStarrClient, RecordedDeletion};
pub use static_settings::StaticSettingsProvider;

/// Queue item builders for common test shapes.
pub mod fixtures {
    use crate::starr::QueueItem;

    /// Healthy downloading item, one gigabyte with half an hour left.
    pub fn queue_item(id: &str, name: &str) -> QueueItem {
        QueueItem {
            id: id.to_string(),
            name: name.to_string(),
            size: 1024 * 1024 * 1024,
            status: "downloading".to_string(),
            eta: 1800,
            error_message: String::new(),
        }
    }

    /// Download with no progress and no ETA.
    pub fn stalled_item(id: &str, name: &str) -> QueueItem {
        let mut item = queue_item(id, name);
        item.status = "stalled".to_string();
        item.eta = 0;
        item
    }

    /// Freshly queued download without progress information.
    pub fn queued_item(id: &str, name: &str) -> QueueItem {
        let mut item = queue_item(id, name);
        item.status = "queued".to_string();
        item.eta = 0;
        item
    }
}
