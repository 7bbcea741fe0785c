//! Sweep cycle orchestration.
//!
//! The orchestrator owns no timer. The server schedules cycles and calls
//! [`SweepOrchestrator::run_cycle`], which makes manual triggers and tests
//! drive the exact same path.

mod runner;
mod types;

pub use runner::SweepOrchestrator;
pub use types::{SweepStatus, SweepTarget};
