use super::types::{RemovedMap, StrikeMap};
use crate::starr::StarrApp;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateStoreError {
    #[error("State file I/O error at {path}: {message}")]
    Io { path: String, message: String },

    #[error("Corrupt state file at {path}: {message}")]
    Corrupt { path: String, message: String },
}

/// Durable storage for strike bookkeeping, partitioned by application.
///
/// All instances of one application type share a partition, so strikes
/// survive an instance being renamed or re-added.
pub trait StrikeStore: Send + Sync {
    fn load_strikes(&self, app: StarrApp) -> Result<StrikeMap, StateStoreError>;
    fn save_strikes(&self, app: StarrApp, strikes: &StrikeMap) -> Result<(), StateStoreError>;
}

/// Durable ledger of removed downloads, partitioned by application.
pub trait RemovedLedger: Send + Sync {
    fn load_removed(&self, app: StarrApp) -> Result<RemovedMap, StateStoreError>;
    fn save_removed(&self, app: StarrApp, removed: &RemovedMap) -> Result<(), StateStoreError>;
}
