use crate::settings::SweepSettings;
use crate::units::{parse_duration, parse_size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a strike was added. The wire strings are part of the removed-items
/// file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrikeReason {
    Metadata,
    #[serde(rename = "ETA too long")]
    EtaTooLong,
    #[serde(rename = "No progress")]
    NoProgress,
}

impl StrikeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrikeReason::Metadata => "Metadata",
            StrikeReason::EtaTooLong => "ETA too long",
            StrikeReason::NoProgress => "No progress",
        }
    }
}

impl fmt::Display for StrikeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of one queue item after a sweep pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Healthy download, nothing recorded.
    Normal,
    /// Known removed download that came back within the re-removal window.
    ReRemoved { dry_run: bool },
    /// Larger than the configured size limit, exempt from striking.
    IgnoredSize,
    /// Backend is intentionally delaying this download.
    IgnoredDelayed,
    /// Queued and still inside the one hour grace window.
    IgnoredRecentlyQueued,
    /// Newly observed queued download, grace window started.
    Monitoring,
    /// Strike added, below the removal threshold.
    Striked { strikes: u32, max: u32 },
    /// Strike threshold reached and the download was removed.
    Removed { dry_run: bool, reason: StrikeReason },
}

impl Verdict {
    /// True for the verdicts counted as ignored in sweep statistics.
    pub fn is_ignored(&self) -> bool {
        matches!(
            self,
            Verdict::IgnoredSize | Verdict::IgnoredDelayed | Verdict::IgnoredRecentlyQueued
        )
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Normal => write!(f, "Normal"),
            Verdict::ReRemoved { dry_run: false } => write!(f, "Re-removed"),
            Verdict::ReRemoved { dry_run: true } => write!(f, "Would Re-remove (Dry Run)"),
            Verdict::IgnoredSize => write!(f, "Ignored (Size)"),
            Verdict::IgnoredDelayed => write!(f, "Ignored (Delayed)"),
            Verdict::IgnoredRecentlyQueued => write!(f, "Ignored (Recently Queued)"),
            Verdict::Monitoring => write!(f, "Monitoring (Queued)"),
            Verdict::Striked { strikes, max } => write!(f, "Striked ({}/{})", strikes, max),
            Verdict::Removed { dry_run: false, .. } => write!(f, "Removed"),
            Verdict::Removed { dry_run: true, .. } => write!(f, "Would Remove (Dry Run)"),
        }
    }
}

/// Sweep settings with the human-readable duration and size strings parsed
/// down to numbers. Resolved once per instance pass so every item in a batch
/// sees the same thresholds.
#[derive(Debug, Clone)]
pub struct ResolvedPolicy {
    pub dry_run: bool,
    pub remove_from_client: bool,
    pub max_strikes: u32,
    pub max_download_time_secs: u64,
    pub ignore_above_size_bytes: u64,
}

impl ResolvedPolicy {
    pub fn from_settings(settings: &SweepSettings) -> Self {
        Self {
            dry_run: settings.dry_run,
            remove_from_client: settings.remove_from_client,
            max_strikes: settings.max_strikes,
            max_download_time_secs: parse_duration(&settings.max_download_time),
            ignore_above_size_bytes: parse_size(&settings.ignore_above_size),
        }
    }
}
