//! Runtime sweep settings.
//!
//! Settings are re-read between instances and every few items within an
//! instance pass, so disabling the sweeper in the configuration file takes
//! effect without a restart.

use crate::config::load_config;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::RwLock;
use thiserror::Error;

/// The `[sweep]` table of the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Evaluate and record strikes but never call the delete API.
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default = "default_max_strikes")]
    pub max_strikes: u32,
    /// Human-readable duration, e.g. "2h", "90m", "1d".
    #[serde(default = "default_max_download_time")]
    pub max_download_time: String,
    /// Human-readable size, e.g. "25GB". Larger downloads are exempt.
    #[serde(default = "default_ignore_above_size")]
    pub ignore_above_size: String,
    /// Also drop the download from the attached download client.
    #[serde(default = "default_remove_from_client")]
    pub remove_from_client: bool,
    /// Seconds between sweep cycles.
    #[serde(default = "default_sleep_duration")]
    pub sleep_duration_secs: u64,
}

fn default_max_strikes() -> u32 {
    3
}

fn default_max_download_time() -> String {
    "2h".to_string()
}

fn default_ignore_above_size() -> String {
    "25GB".to_string()
}

fn default_remove_from_client() -> bool {
    true
}

fn default_sleep_duration() -> u64 {
    900
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            dry_run: false,
            max_strikes: default_max_strikes(),
            max_download_time: default_max_download_time(),
            ignore_above_size: default_ignore_above_size(),
            remove_from_client: default_remove_from_client(),
            sleep_duration_secs: default_sleep_duration(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to reload sweep settings: {0}")]
    Reload(String),
}

/// Source of the current sweep settings.
pub trait SettingsProvider: Send + Sync {
    /// The last refreshed settings, without touching the backing source.
    fn snapshot(&self) -> SweepSettings;

    /// Re-reads the backing source. A failed refresh leaves the last
    /// snapshot in place.
    fn refresh(&self) -> Result<SweepSettings, SettingsError>;
}

/// Settings provider backed by the configuration file's `[sweep]` table.
pub struct FileSettingsProvider {
    path: PathBuf,
    cached: RwLock<SweepSettings>,
}

impl FileSettingsProvider {
    pub fn new(path: impl Into<PathBuf>, initial: SweepSettings) -> Self {
        Self {
            path: path.into(),
            cached: RwLock::new(initial),
        }
    }
}

impl SettingsProvider for FileSettingsProvider {
    fn snapshot(&self) -> SweepSettings {
        self.cached.read().unwrap().clone()
    }

    fn refresh(&self) -> Result<SweepSettings, SettingsError> {
        let config = load_config(&self.path).map_err(|e| SettingsError::Reload(e.to_string()))?;
        let mut cached = self.cached.write().unwrap();
        *cached = config.sweep.clone();
        Ok(config.sweep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = SweepSettings::default();
        assert!(!settings.enabled);
        assert!(!settings.dry_run);
        assert_eq!(settings.max_strikes, 3);
        assert_eq!(settings.max_download_time, "2h");
        assert_eq!(settings.ignore_above_size, "25GB");
        assert!(settings.remove_from_client);
        assert_eq!(settings.sleep_duration_secs, 900);
    }

    #[test]
    fn test_deserialize_fills_missing_fields() {
        let settings: SweepSettings = toml::from_str("enabled = true\nmax_strikes = 5").unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.max_strikes, 5);
        assert_eq!(settings.max_download_time, "2h");
        assert!(settings.remove_from_client);
    }

    #[test]
    fn test_file_provider_picks_up_edits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[sweep]\nenabled = true\nmax_strikes = 4\n").unwrap();

        let provider = FileSettingsProvider::new(&path, SweepSettings::default());
        assert!(!provider.snapshot().enabled);

        let settings = provider.refresh().unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.max_strikes, 4);
        assert!(provider.snapshot().enabled);

        fs::write(&path, "[sweep]\nenabled = false\n").unwrap();
        let settings = provider.refresh().unwrap();
        assert!(!settings.enabled);
        assert_eq!(settings.max_strikes, 3);
    }

    #[test]
    fn test_file_provider_keeps_snapshot_on_failed_refresh() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[sweep]\nenabled = true\n").unwrap();

        let provider = FileSettingsProvider::new(&path, SweepSettings::default());
        provider.refresh().unwrap();

        fs::remove_file(&path).unwrap();
        assert!(provider.refresh().is_err());
        assert!(provider.snapshot().enabled);
    }
}
