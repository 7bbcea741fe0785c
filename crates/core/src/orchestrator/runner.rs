use super::types::{SweepStatus, SweepTarget};
use crate::metrics;
use crate::policy::{PolicyEngine, ResolvedPolicy};
use crate::settings::{SettingsProvider, SweepSettings};
use crate::stats::{SessionStats, TallyFile};
use crate::store::{RemovedLedger, RemovedMap, StrikeMap, StrikeStore};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

/// How many items are processed between settings polls within one instance.
const SETTINGS_POLL_INTERVAL: u32 = 10;

/// Drives sweep cycles across all configured instances.
///
/// A cycle refreshes the settings, walks every enabled instance in
/// configuration order and hands each queue item to the policy engine.
/// Failures are absorbed at the instance boundary so one unreachable
/// backend never blocks the others.
pub struct SweepOrchestrator {
    targets: Vec<SweepTarget>,
    settings: Arc<dyn SettingsProvider>,
    strike_store: Arc<dyn StrikeStore>,
    removed_ledger: Arc<dyn RemovedLedger>,
    tally: Option<TallyFile>,
    session: RwLock<SessionStats>,
    // Serializes cycles so a manual trigger cannot overlap the scheduler.
    cycle_lock: Mutex<()>,
}

impl SweepOrchestrator {
    pub fn new(
        targets: Vec<SweepTarget>,
        settings: Arc<dyn SettingsProvider>,
        strike_store: Arc<dyn StrikeStore>,
        removed_ledger: Arc<dyn RemovedLedger>,
    ) -> Self {
        Self {
            targets,
            settings,
            strike_store,
            removed_ledger,
            tally: None,
            session: RwLock::new(SessionStats::new()),
            cycle_lock: Mutex::new(()),
        }
    }

    /// Attach a durable tally that accumulates counters across restarts.
    pub fn with_tally(mut self, tally: TallyFile) -> Self {
        self.tally = Some(tally);
        self
    }

    /// Runs one full detection cycle. Never fails, all errors are logged
    /// and counted.
    pub async fn run_cycle(&self) {
        let _guard = self.cycle_lock.lock().await;

        let settings = match self.settings.refresh() {
            Ok(settings) => settings,
            Err(e) => {
                error!("Skipping sweep cycle, settings refresh failed: {}", e);
                let mut session = self.session.write().await;
                session.errors_encountered += 1;
                return;
            }
        };
        if !settings.enabled {
            debug!("Sweeping is disabled, skipping cycle");
            return;
        }

        let enabled_count = self.targets.iter().filter(|t| t.enabled).count();
        if enabled_count == 0 {
            info!("No instances have sweeping enabled, nothing to do");
            return;
        }

        info!(
            "Starting sweep cycle across {} of {} configured instances",
            enabled_count,
            self.targets.len()
        );
        metrics::SWEEP_CYCLES.inc();

        let mut cycle = SessionStats::new();
        for target in &self.targets {
            if !target.enabled {
                debug!(
                    "Skipping {} instance '{}', sweeping not enabled",
                    target.app, target.instance_name
                );
                continue;
            }
            // Settings may have changed while the previous instance was
            // processed.
            match self.settings.refresh() {
                Ok(s) if s.enabled => self.process_instance(target, &s, &mut cycle).await,
                Ok(_) => {
                    warn!("Sweeping was disabled mid-cycle, stopping early");
                    break;
                }
                Err(e) => {
                    error!("Settings refresh failed mid-cycle, stopping early: {}", e);
                    cycle.errors_encountered += 1;
                    break;
                }
            }
        }

        info!(
            "Sweep cycle complete: {} processed, {} strikes added, {} removed, {} ignored, {} API calls, {} errors",
            cycle.total_processed,
            cycle.strikes_added,
            cycle.downloads_removed,
            cycle.items_ignored,
            cycle.api_calls_made,
            cycle.errors_encountered
        );

        if let Some(tally) = &self.tally {
            tally.record(&cycle);
        }
        let mut session = self.session.write().await;
        session.merge(&cycle);
    }

    async fn process_instance(
        &self,
        target: &SweepTarget,
        settings: &SweepSettings,
        cycle: &mut SessionStats,
    ) {
        let app = target.app;
        info!(
            "Checking download queue for {} instance: {}",
            app, target.instance_name
        );

        let mut strikes = match self.strike_store.load_strikes(app) {
            Ok(map) => map,
            Err(e) => {
                error!("Error loading strike data for {}: {}", app, e);
                cycle.errors_encountered += 1;
                StrikeMap::new()
            }
        };
        let mut removed = match self.removed_ledger.load_removed(app) {
            Ok(map) => map,
            Err(e) => {
                error!("Error loading removed downloads for {}: {}", app, e);
                cycle.errors_encountered += 1;
                RemovedMap::new()
            }
        };

        let fetch = target.client.fetch_queue().await;
        cycle.api_calls_made += u64::from(fetch.api_calls);
        metrics::QUEUE_ITEMS
            .with_label_values(&[app.as_str()])
            .observe(fetch.items.len() as f64);
        if let Some(e) = &fetch.error {
            error!(
                "Error fetching queue for {} instance {}: {}",
                app, target.instance_name, e
            );
            cycle.errors_encountered += 1;
            metrics::QUEUE_FETCH_ERRORS
                .with_label_values(&[app.as_str()])
                .inc();
        }

        if fetch.items.is_empty() {
            info!(
                "No downloads to process for {} instance: {}",
                app, target.instance_name
            );
            return;
        }
        info!(
            "Found {} downloads in queue for {} instance: {}",
            fetch.items.len(),
            app,
            target.instance_name
        );

        let policy = ResolvedPolicy::from_settings(settings);
        let engine = PolicyEngine::new(&policy, target.client.as_ref());

        let mut processed = 0u32;
        for item in &fetch.items {
            // Poll for a mid-run disable every few items.
            if processed % SETTINGS_POLL_INTERVAL == 0 {
                match self.settings.refresh() {
                    Ok(s) if s.enabled => {}
                    Ok(_) => {
                        warn!(
                            "Sweeping was disabled during queue processing for {} instance: {}. Stopping after {} items",
                            app, target.instance_name, processed
                        );
                        break;
                    }
                    Err(e) => {
                        error!("Settings refresh failed during queue processing: {}", e);
                        cycle.errors_encountered += 1;
                        break;
                    }
                }
            }
            engine
                .evaluate(item, &mut strikes, &mut removed, Utc::now(), cycle)
                .await;
            processed += 1;
        }

        if let Err(e) = self.strike_store.save_strikes(app, &strikes) {
            error!("Error saving strike data for {}: {}", app, e);
            cycle.errors_encountered += 1;
        }
        if let Err(e) = self.removed_ledger.save_removed(app, &removed) {
            error!("Error saving removed downloads for {}: {}", app, e);
            cycle.errors_encountered += 1;
        }

        cycle.last_run_time = Some(Utc::now());
        cycle.apps_processed.insert(app);
        info!(
            "Finished processing {} downloads for {} instance: {}",
            processed, app, target.instance_name
        );
    }

    /// Session counters accumulated since startup or the last reset.
    pub async fn session_stats(&self) -> SessionStats {
        self.session.read().await.clone()
    }

    pub async fn reset_session_stats(&self) {
        let mut session = self.session.write().await;
        session.reset();
        info!("Sweep session statistics reset");
    }

    /// Current sweeper state from the last settings snapshot, without I/O.
    pub fn status(&self) -> SweepStatus {
        let settings = self.settings.snapshot();
        SweepStatus {
            enabled: settings.enabled,
            dry_run: settings.dry_run,
            instances_configured: self.targets.len(),
            instances_enabled: self.targets.iter().filter(|t| t.enabled).count(),
        }
    }
}
