use super::traits::{RemovedLedger, StateStoreError, StrikeStore};
use super::types::{RemovedMap, StrikeMap};
use crate::starr::StarrApp;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const STRIKES_FILE: &str = "strikes.json";
const REMOVED_FILE: &str = "removed_items.json";

/// File-backed state store, one directory per application under the
/// state root:
///
/// ```text
/// {root}/radarr/strikes.json
/// {root}/radarr/removed_items.json
/// ```
///
/// A missing file reads as an empty map so first runs need no setup.
pub struct JsonStateStore {
    root: PathBuf,
}

impl JsonStateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn app_file(&self, app: StarrApp, file: &str) -> PathBuf {
        self.root.join(app.as_str()).join(file)
    }

    fn load_map<T: DeserializeOwned>(path: &Path) -> Result<HashMap<String, T>, StateStoreError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(io_error(path, e)),
        };

        serde_json::from_str(&contents).map_err(|e| StateStoreError::Corrupt {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn save_map<T: Serialize>(
        path: &Path,
        map: &HashMap<String, T>,
    ) -> Result<(), StateStoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(path, e))?;
        }
        let json = serde_json::to_string_pretty(map).map_err(|e| io_error(path, e))?;
        fs::write(path, json).map_err(|e| io_error(path, e))
    }
}

fn io_error(path: &Path, e: impl ToString) -> StateStoreError {
    StateStoreError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

impl StrikeStore for JsonStateStore {
    fn load_strikes(&self, app: StarrApp) -> Result<StrikeMap, StateStoreError> {
        Self::load_map(&self.app_file(app, STRIKES_FILE))
    }

    fn save_strikes(&self, app: StarrApp, strikes: &StrikeMap) -> Result<(), StateStoreError> {
        Self::save_map(&self.app_file(app, STRIKES_FILE), strikes)
    }
}

impl RemovedLedger for JsonStateStore {
    fn load_removed(&self, app: StarrApp) -> Result<RemovedMap, StateStoreError> {
        Self::load_map(&self.app_file(app, REMOVED_FILE))
    }

    fn save_removed(&self, app: StarrApp, removed: &RemovedMap) -> Result<(), StateStoreError> {
        Self::save_map(&self.app_file(app, REMOVED_FILE), removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::StrikeReason;
    use crate::store::types::{RemovedEntry, StrikeRecord};
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_missing_files_read_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonStateStore::new(dir.path());

        assert!(store.load_strikes(StarrApp::Radarr).unwrap().is_empty());
        assert!(store.load_removed(StarrApp::Radarr).unwrap().is_empty());
    }

    #[test]
    fn test_strikes_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = JsonStateStore::new(dir.path());

        let mut strikes = StrikeMap::new();
        let mut record = StrikeRecord::new("Stuck Download", Utc::now());
        record.strikes = 2;
        record.last_strike_time = Some(Utc::now());
        strikes.insert("41".to_string(), record.clone());

        store.save_strikes(StarrApp::Sonarr, &strikes).unwrap();
        let loaded = store.load_strikes(StarrApp::Sonarr).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["41"], record);
    }

    #[test]
    fn test_removed_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = JsonStateStore::new(dir.path());

        let mut removed = RemovedMap::new();
        removed.insert(
            "abcd1234".to_string(),
            RemovedEntry {
                name: "Gone Download".to_string(),
                size: 1024,
                removed_time: Utc::now(),
                reason: StrikeReason::NoProgress,
            },
        );

        store.save_removed(StarrApp::Lidarr, &removed).unwrap();
        let loaded = store.load_removed(StarrApp::Lidarr).unwrap();
        assert_eq!(loaded["abcd1234"].name, "Gone Download");
        assert_eq!(loaded["abcd1234"].reason, StrikeReason::NoProgress);
    }

    #[test]
    fn test_apps_are_partitioned_by_directory() {
        let dir = TempDir::new().unwrap();
        let store = JsonStateStore::new(dir.path());

        let mut strikes = StrikeMap::new();
        strikes.insert("1".to_string(), StrikeRecord::new("A", Utc::now()));
        store.save_strikes(StarrApp::Radarr, &strikes).unwrap();

        assert!(dir.path().join("radarr").join("strikes.json").exists());
        assert!(store.load_strikes(StarrApp::Sonarr).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let app_dir = dir.path().join("radarr");
        fs::create_dir_all(&app_dir).unwrap();
        fs::write(app_dir.join("strikes.json"), "{not valid json").unwrap();

        let store = JsonStateStore::new(dir.path());
        let err = store.load_strikes(StarrApp::Radarr).unwrap_err();
        assert!(matches!(err, StateStoreError::Corrupt { .. }));
    }
}
