//! Starr application queue clients.
//!
//! Radarr, Sonarr, Whisparr and Eros speak the v3 queue API with a paged
//! envelope; Lidarr and Readarr speak v1 with a bare record list. Both are
//! normalized into the same [`QueueItem`] shape here.

mod client;
mod types;

pub use client::HttpStarrClient;
pub use types::{ApiVersion, QueueFetch, QueueItem, StarrApp, StarrClient, StarrError};
