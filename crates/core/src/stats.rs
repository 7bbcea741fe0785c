//! Sweep statistics.
//!
//! [`SessionStats`] counts activity since process start (or the last reset)
//! and is what the stats API serves. [`TallyFile`] keeps a small set of
//! all-time counters that survive restarts.

use crate::starr::StarrApp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Counters for sweep activity within the current session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_processed: u64,
    pub strikes_added: u64,
    pub downloads_removed: u64,
    pub items_ignored: u64,
    /// Every HTTP request made against the Starr APIs, fetches and deletes.
    pub api_calls_made: u64,
    pub errors_encountered: u64,
    pub last_run_time: Option<DateTime<Utc>>,
    /// Applications that completed at least one instance pass.
    pub apps_processed: BTreeSet<StarrApp>,
    pub session_start_time: DateTime<Utc>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            total_processed: 0,
            strikes_added: 0,
            downloads_removed: 0,
            items_ignored: 0,
            api_calls_made: 0,
            errors_encountered: 0,
            last_run_time: None,
            apps_processed: BTreeSet::new(),
            session_start_time: Utc::now(),
        }
    }

    /// Folds the counters from one cycle into the session totals.
    pub fn merge(&mut self, other: &SessionStats) {
        self.total_processed += other.total_processed;
        self.strikes_added += other.strikes_added;
        self.downloads_removed += other.downloads_removed;
        self.items_ignored += other.items_ignored;
        self.api_calls_made += other.api_calls_made;
        self.errors_encountered += other.errors_encountered;
        self.last_run_time = match (self.last_run_time, other.last_run_time) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self.apps_processed.extend(other.apps_processed.iter().copied());
    }

    pub fn reset(&mut self) {
        *self = SessionStats::new();
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// All-time counters persisted under the state root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyCounters {
    #[serde(default)]
    pub processed: u64,
    #[serde(default)]
    pub strikes: u64,
    #[serde(default)]
    pub removals: u64,
    #[serde(default)]
    pub ignored: u64,
}

/// Durable tally at `{state_root}/tally/sweep_stats.json`.
///
/// Tally failures are logged and absorbed, a broken stats file must never
/// block sweeping.
pub struct TallyFile {
    path: PathBuf,
}

impl TallyFile {
    pub fn new(state_root: impl AsRef<Path>) -> Self {
        Self {
            path: state_root.as_ref().join("tally").join("sweep_stats.json"),
        }
    }

    pub fn load(&self) -> TallyCounters {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return TallyCounters::default();
            }
            Err(e) => {
                warn!("Failed to read tally file {}: {}", self.path.display(), e);
                return TallyCounters::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(counters) => counters,
            Err(e) => {
                warn!(
                    "Corrupt tally file {}, starting fresh: {}",
                    self.path.display(),
                    e
                );
                TallyCounters::default()
            }
        }
    }

    /// Adds one cycle's counters to the tally.
    pub fn record(&self, delta: &SessionStats) {
        let mut counters = self.load();
        counters.processed += delta.total_processed;
        counters.strikes += delta.strikes_added;
        counters.removals += delta.downloads_removed;
        counters.ignored += delta.items_ignored;
        if let Err(e) = self.save(&counters) {
            warn!("Failed to write tally file {}: {}", self.path.display(), e);
        }
    }

    pub fn reset(&self) {
        if let Err(e) = self.save(&TallyCounters::default()) {
            warn!("Failed to reset tally file {}: {}", self.path.display(), e);
        }
    }

    // Write-to-temp then rename so a crash mid-write cannot corrupt the
    // existing tally.
    fn save(&self, counters: &TallyCounters) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(counters)?;
        let mut file = fs::File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)
    }
}
