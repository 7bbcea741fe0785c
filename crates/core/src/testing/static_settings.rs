use crate::settings::{SettingsError, SettingsProvider, SweepSettings};
use std::sync::Mutex;

/// Scriptable settings provider for tests.
///
/// Supports flipping settings between cycles, failing refreshes and
/// simulating a configuration edit that disables the sweep mid-run.
pub struct StaticSettingsProvider {
    inner: Mutex<Inner>,
}

struct Inner {
    settings: SweepSettings,
    refreshes: u32,
    disable_after: Option<u32>,
    fail_refresh: bool,
}

impl StaticSettingsProvider {
    pub fn new(settings: SweepSettings) -> Self {
        Self {
            inner: Mutex::new(Inner {
                settings,
                refreshes: 0,
                disable_after: None,
                fail_refresh: false,
            }),
        }
    }

    /// Default settings with the sweep switched on.
    pub fn enabled() -> Self {
        Self::new(SweepSettings {
            enabled: true,
            ..SweepSettings::default()
        })
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.inner.lock().unwrap().settings.enabled = enabled;
    }

    pub fn set_dry_run(&self, dry_run: bool) {
        self.inner.lock().unwrap().settings.dry_run = dry_run;
    }

    pub fn set_max_strikes(&self, max_strikes: u32) {
        self.inner.lock().unwrap().settings.max_strikes = max_strikes;
    }

    /// Refreshes after the first `n` report the sweep as disabled, like an
    /// operator editing the configuration while a cycle runs.
    pub fn disable_after_refreshes(&self, n: u32) {
        self.inner.lock().unwrap().disable_after = Some(n);
    }

    pub fn set_fail_refresh(&self, fail: bool) {
        self.inner.lock().unwrap().fail_refresh = fail;
    }

    pub fn refresh_count(&self) -> u32 {
        self.inner.lock().unwrap().refreshes
    }
}

impl SettingsProvider for StaticSettingsProvider {
    fn snapshot(&self) -> SweepSettings {
        self.inner.lock().unwrap().settings.clone()
    }

    fn refresh(&self) -> Result<SweepSettings, SettingsError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_refresh {
            return Err(SettingsError::Reload(
                "injected refresh failure".to_string(),
            ));
        }
        inner.refreshes += 1;
        if let Some(n) = inner.disable_after {
            if inner.refreshes > n {
                inner.settings.enabled = false;
            }
        }
        Ok(inner.settings.clone())
    }
}
