//! Durable sweep state.
//!
//! Strike counts and the removed-download ledger are persisted per
//! application type, not per instance, so two Radarr instances pointing at
//! the same library share history.

mod json_store;
mod traits;
mod types;

pub use json_store::JsonStateStore;
pub use traits::{RemovedLedger, StateStoreError, StrikeStore};
pub use types::{RemovedEntry, RemovedMap, StrikeMap, StrikeRecord};
