use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors surfaced by Starr API clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StarrError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("API error: {0}")]
    ApiError(String),
}

/// The Starr applications whose download queues can be swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StarrApp {
    Radarr,
    Sonarr,
    Lidarr,
    Readarr,
    Whisparr,
    Eros,
}

impl StarrApp {
    pub fn as_str(&self) -> &'static str {
        match self {
            StarrApp::Radarr => "radarr",
            StarrApp::Sonarr => "sonarr",
            StarrApp::Lidarr => "lidarr",
            StarrApp::Readarr => "readarr",
            StarrApp::Whisparr => "whisparr",
            StarrApp::Eros => "eros",
        }
    }

    /// Queue API version spoken by this application.
    pub fn api_version(&self) -> ApiVersion {
        match self {
            StarrApp::Radarr | StarrApp::Sonarr | StarrApp::Whisparr | StarrApp::Eros => {
                ApiVersion::V3
            }
            StarrApp::Lidarr | StarrApp::Readarr => ApiVersion::V1,
        }
    }
}

impl fmt::Display for StarrApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Starr queue API versions. V3 responses wrap records in a paging envelope,
/// V1 responses are a bare record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVersion {
    V1,
    #[default]
    V3,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V3 => "v3",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A normalized download queue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Backend-native queue identifier, stringified.
    pub id: String,
    /// Human-readable name resolved from the media title when available.
    pub name: String,
    /// Download size in bytes.
    pub size: u64,
    /// Lowercased status, "unknown" when the backend omits it.
    pub status: String,
    /// Estimated seconds until completion, 0 when unknown.
    pub eta: u64,
    /// Backend error message, empty when absent.
    pub error_message: String,
}

impl QueueItem {
    /// Stable identity across queue id churn, derived from name and size.
    /// Used to recognize downloads that reappear after removal.
    pub fn fingerprint(&self) -> String {
        let digest = md5::compute(format!("{}_{}", self.name, self.size));
        format!("{:x}", digest)
    }
}

/// Outcome of a queue fetch. Items gathered before a mid-pagination failure
/// are kept alongside the error so partial queues can still be swept.
#[derive(Debug)]
pub struct QueueFetch {
    pub items: Vec<QueueItem>,
    /// Number of HTTP requests issued, including the failed one.
    pub api_calls: u32,
    pub error: Option<StarrError>,
}

/// Abstraction over a single Starr instance's queue API.
#[async_trait]
pub trait StarrClient: Send + Sync {
    /// The application this client talks to.
    fn app(&self) -> StarrApp;

    /// Fetch the full download queue, following pagination.
    async fn fetch_queue(&self) -> QueueFetch;

    /// Remove a download from the queue, blocklisting its release.
    /// Callers must not treat the download as removed unless this returns Ok.
    async fn delete_download(&self, id: &str, remove_from_client: bool) -> Result<(), StarrError>;
}
