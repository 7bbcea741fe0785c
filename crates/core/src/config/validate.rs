use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - sweep.max_strikes is at least 1
/// - Enabled instances have a URL and an API key
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.sweep.max_strikes == 0 {
        return Err(ConfigError::ValidationError(
            "sweep.max_strikes must be at least 1".to_string(),
        ));
    }

    for instance in &config.instances {
        if instance.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "instance name cannot be empty".to_string(),
            ));
        }
        if instance.enabled {
            if instance.api_url.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "instance '{}' is enabled but has no api_url",
                    instance.name
                )));
            }
            if instance.api_key.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "instance '{}' is enabled but has no api_key",
                    instance.name
                )));
            }
        }
    }

    Ok(())
}
