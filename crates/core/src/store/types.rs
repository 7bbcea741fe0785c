use crate::policy::StrikeReason;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Strike bookkeeping for one queue item, keyed by queue id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeRecord {
    pub strikes: u32,
    pub name: String,
    /// Set when the item is first observed and never changed afterwards.
    pub first_strike_time: DateTime<Utc>,
    pub last_strike_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub removed: bool,
    #[serde(default)]
    pub removed_time: Option<DateTime<Utc>>,
}

impl StrikeRecord {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            strikes: 0,
            name: name.into(),
            first_strike_time: now,
            last_strike_time: None,
            removed: false,
            removed_time: None,
        }
    }
}

/// Ledger entry for a removed download, keyed by fingerprint so the same
/// release is recognized even when the backend assigns a fresh queue id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovedEntry {
    pub name: String,
    pub size: u64,
    pub removed_time: DateTime<Utc>,
    pub reason: StrikeReason,
}

/// Strike records keyed by queue id.
pub type StrikeMap = HashMap<String, StrikeRecord>;

/// Removed download entries keyed by fingerprint.
pub type RemovedMap = HashMap<String, RemovedEntry>;
