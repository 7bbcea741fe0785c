use crate::starr::{StarrApp, StarrClient};
use serde::Serialize;
use std::sync::Arc;

/// One Starr instance wired up for sweeping.
#[derive(Clone)]
pub struct SweepTarget {
    pub app: StarrApp,
    /// Display name from the configuration, used in logs.
    pub instance_name: String,
    /// Per-instance opt-in, independent of the global sweep switch.
    pub enabled: bool,
    pub client: Arc<dyn StarrClient>,
}

/// Snapshot of the sweeper for the status API.
#[derive(Debug, Clone, Serialize)]
pub struct SweepStatus {
    pub enabled: bool,
    pub dry_run: bool,
    pub instances_configured: usize,
    pub instances_enabled: usize,
}
