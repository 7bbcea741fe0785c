use super::types::{ResolvedPolicy, StrikeReason, Verdict};
use crate::metrics;
use crate::starr::{QueueItem, StarrClient};
use crate::stats::SessionStats;
use crate::store::{RemovedEntry, RemovedMap, StrikeMap, StrikeRecord};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

/// Applies the strike policy to queue items, mutating the strike and
/// removed maps in place. The caller persists the maps afterwards.
///
/// Rules are checked in order and the first match wins:
/// 1. reappeared after a recent removal, 2. size exemption, 3. delayed,
/// 4. queued grace window, 5. strike evaluation.
pub struct PolicyEngine<'a> {
    policy: &'a ResolvedPolicy,
    client: &'a dyn StarrClient,
}

impl<'a> PolicyEngine<'a> {
    pub fn new(policy: &'a ResolvedPolicy, client: &'a dyn StarrClient) -> Self {
        Self { policy, client }
    }

    pub async fn evaluate(
        &self,
        item: &QueueItem,
        strikes: &mut StrikeMap,
        removed: &mut RemovedMap,
        now: DateTime<Utc>,
        stats: &mut SessionStats,
    ) -> Verdict {
        let app = self.client.app();
        stats.total_processed += 1;
        metrics::ITEMS_PROCESSED
            .with_label_values(&[app.as_str()])
            .inc();

        let verdict = self.classify(item, strikes, removed, now, stats).await;
        if verdict.is_ignored() {
            stats.items_ignored += 1;
            metrics::ITEMS_IGNORED
                .with_label_values(&[app.as_str()])
                .inc();
        }
        debug!("Processed download: {} - State: {}", item.name, verdict);
        verdict
    }

    async fn classify(
        &self,
        item: &QueueItem,
        strikes: &mut StrikeMap,
        removed: &mut RemovedMap,
        now: DateTime<Utc>,
        stats: &mut SessionStats,
    ) -> Verdict {
        // A download seen again within a week of being removed skips the
        // strike ladder and is removed outright.
        let fingerprint = item.fingerprint();
        if let Some(entry) = removed.get_mut(&fingerprint) {
            let age = now.signed_duration_since(entry.removed_time);
            if age < Duration::days(7) {
                warn!(
                    "Found previously removed download that reappeared: {} (removed {} days ago)",
                    item.name,
                    age.num_days()
                );
                if self.policy.dry_run {
                    info!(
                        "DRY RUN: Would have re-removed reappeared download: {}",
                        item.name
                    );
                    entry.removed_time = now;
                    return Verdict::ReRemoved { dry_run: true };
                }
                if self.delete(item, stats).await {
                    info!("Re-removed reappeared download: {}", item.name);
                    entry.removed_time = now;
                }
                return Verdict::ReRemoved { dry_run: false };
            }
        }

        if item.size >= self.policy.ignore_above_size_bytes {
            debug!(
                "Ignoring large download: {} ({} bytes)",
                item.name, item.size
            );
            return Verdict::IgnoredSize;
        }

        if item.status == "delay" {
            debug!("Ignoring delayed download: {}", item.name);
            return Verdict::IgnoredDelayed;
        }

        let metadata_issue = has_metadata_issue(item);

        // Queued downloads get an hour of grace before strike evaluation,
        // unless they are stuck on metadata.
        if item.status == "queued" && !metadata_issue {
            match strikes.get(&item.id) {
                Some(record) => {
                    if now.signed_duration_since(record.first_strike_time) < Duration::hours(1) {
                        debug!("Ignoring recently queued download: {}", item.name);
                        return Verdict::IgnoredRecentlyQueued;
                    }
                    // Past the grace window, falls through to strike
                    // evaluation.
                }
                None => {
                    strikes.insert(item.id.clone(), StrikeRecord::new(&item.name, now));
                    debug!("Started monitoring queued download: {}", item.name);
                    return Verdict::Monitoring;
                }
            }
        }

        let reason = if metadata_issue {
            Some(StrikeReason::Metadata)
        } else if item.eta >= self.policy.max_download_time_secs {
            Some(StrikeReason::EtaTooLong)
        } else if item.eta == 0 && item.status != "queued" && item.status != "delay" {
            Some(StrikeReason::NoProgress)
        } else {
            None
        };

        let Some(reason) = reason else {
            return Verdict::Normal;
        };

        let app = self.client.app();
        let record = strikes
            .entry(item.id.clone())
            .or_insert_with(|| StrikeRecord::new(&item.name, now));
        record.strikes += 1;
        record.last_strike_time = Some(now);
        stats.strikes_added += 1;
        metrics::STRIKES_ADDED
            .with_label_values(&[app.as_str()])
            .inc();
        info!(
            "Added strike ({}/{}) to {} - Reason: {}",
            record.strikes, self.policy.max_strikes, item.name, reason
        );

        if record.strikes < self.policy.max_strikes {
            return Verdict::Striked {
                strikes: record.strikes,
                max: self.policy.max_strikes,
            };
        }

        warn!("Max strikes reached for {}, removing download", item.name);
        let removal_confirmed = if self.policy.dry_run {
            info!(
                "DRY RUN: Would have removed {} after {} strikes",
                item.name, record.strikes
            );
            true
        } else {
            self.delete(item, stats).await
        };

        if !removal_confirmed {
            // The strike sticks, removal is retried next cycle.
            return Verdict::Striked {
                strikes: record.strikes,
                max: self.policy.max_strikes,
            };
        }

        record.removed = true;
        record.removed_time = Some(now);
        removed.insert(
            fingerprint,
            RemovedEntry {
                name: item.name.clone(),
                size: item.size,
                removed_time: now,
                reason,
            },
        );
        Verdict::Removed {
            dry_run: self.policy.dry_run,
            reason,
        }
    }

    /// Issues the actual queue deletion. Returns false on failure so callers
    /// leave their bookkeeping unchanged.
    async fn delete(&self, item: &QueueItem, stats: &mut SessionStats) -> bool {
        let app = self.client.app();
        stats.api_calls_made += 1;
        match self
            .client
            .delete_download(&item.id, self.policy.remove_from_client)
            .await
        {
            Ok(()) => {
                stats.downloads_removed += 1;
                metrics::DOWNLOADS_REMOVED
                    .with_label_values(&[app.as_str()])
                    .inc();
                true
            }
            Err(e) => {
                error!("Error removing download {} from {}: {}", item.name, app, e);
                stats.errors_encountered += 1;
                metrics::DELETE_ERRORS
                    .with_label_values(&[app.as_str()])
                    .inc();
                false
            }
        }
    }
}

/// Metadata stalls show up in the status or the error message depending on
/// the backend version.
fn has_metadata_issue(item: &QueueItem) -> bool {
    item.status.contains("metadata") || item.error_message.to_lowercase().contains("metadata")
}
