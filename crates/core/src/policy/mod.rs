//! Strike policy for stalled downloads.
//!
//! Downloads earn strikes across sweep cycles for metadata stalls, excessive
//! ETAs or missing progress. At the strike limit they are removed from the
//! queue and blocklisted, and remembered for a week so a re-grabbed copy of
//! the same release is removed on sight.

mod engine;
mod types;

pub use engine::PolicyEngine;
pub use types::{ResolvedPolicy, StrikeReason, Verdict};
