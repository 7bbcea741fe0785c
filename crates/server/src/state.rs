use std::sync::Arc;

use reaparr_core::{Config, SanitizedConfig, SweepOrchestrator};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<SweepOrchestrator>,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Arc<SweepOrchestrator>) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    /// Get a sanitized version of the config (no secrets)
    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn orchestrator(&self) -> &Arc<SweepOrchestrator> {
        &self.orchestrator
    }
}
