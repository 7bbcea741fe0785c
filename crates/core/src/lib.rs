//! Core sweeping logic for Reaparr.
//!
//! Reaparr watches the download queues of Starr applications (Radarr,
//! Sonarr, Lidarr, Readarr, Whisparr, Eros) and removes downloads that
//! stall, after a configurable number of strikes. This crate holds the
//! queue clients, the strike policy, durable state and the cycle
//! orchestrator; the server crate adds the HTTP API and the scheduler.

pub mod config;
pub mod metrics;
pub mod orchestrator;
pub mod policy;
pub mod settings;
pub mod starr;
pub mod stats;
pub mod store;
pub mod testing;
pub mod units;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, InstanceConfig,
    SanitizedConfig, SanitizedInstanceConfig, ServerConfig, StateConfig,
};
pub use orchestrator::{SweepOrchestrator, SweepStatus, SweepTarget};
pub use policy::{PolicyEngine, ResolvedPolicy, StrikeReason, Verdict};
pub use settings::{FileSettingsProvider, SettingsError, SettingsProvider, SweepSettings};
pub use starr::{
    ApiVersion, HttpStarrClient, QueueFetch, QueueItem, StarrApp, StarrClient, StarrError,
};
pub use stats::{SessionStats, TallyCounters, TallyFile};
pub use store::{
    JsonStateStore, RemovedEntry, RemovedLedger, RemovedMap, StateStoreError, StrikeMap,
    StrikeRecord, StrikeStore,
};
pub use units::{parse_duration, parse_size};
