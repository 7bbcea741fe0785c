use crate::settings::SweepSettings;
use crate::starr::StarrApp;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub sweep: SweepSettings,
    /// Monitored Starr instances, `[[instance]]` tables in the file.
    #[serde(default, rename = "instance")]
    pub instances: Vec<InstanceConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8484
}

/// State directory configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StateConfig {
    /// Directory holding strike files, the removed ledger and the tally.
    #[serde(default = "default_state_root")]
    pub root: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            root: default_state_root(),
        }
    }
}

fn default_state_root() -> PathBuf {
    PathBuf::from("state")
}

/// One monitored Starr instance
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstanceConfig {
    pub app: StarrApp,
    /// Display name used in logs, e.g. "radarr-4k".
    pub name: String,
    /// Base URL, e.g. "http://localhost:7878".
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Instances are opt-in, a freshly added one is not swept.
    #[serde(default)]
    pub enabled: bool,
    /// Request timeout in seconds (default: 120)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    120
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub state: StateConfig,
    pub sweep: SweepSettings,
    pub instances: Vec<SanitizedInstanceConfig>,
}

/// Sanitized instance config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedInstanceConfig {
    pub app: StarrApp,
    pub name: String,
    pub api_url: String,
    pub api_key_configured: bool,
    pub enabled: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            state: config.state.clone(),
            sweep: config.sweep.clone(),
            instances: config
                .instances
                .iter()
                .map(|i| SanitizedInstanceConfig {
                    app: i.app,
                    name: i.name.clone(),
                    api_url: i.api_url.clone(),
                    api_key_configured: !i.api_key.is_empty(),
                    enabled: i.enabled,
                    timeout_secs: i.timeout_secs,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[state]
root = "/var/lib/reaparr"

[sweep]
enabled = true
max_strikes = 5

[[instance]]
app = "radarr"
name = "radarr-main"
api_url = "http://localhost:7878"
api_key = "secret"
enabled = true

[[instance]]
app = "lidarr"
name = "lidarr"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.state.root.to_str().unwrap(), "/var/lib/reaparr");
        assert!(config.sweep.enabled);
        assert_eq!(config.sweep.max_strikes, 5);
        assert_eq!(config.instances.len(), 2);
        assert_eq!(config.instances[0].app, StarrApp::Radarr);
        assert!(config.instances[0].enabled);
        assert_eq!(config.instances[0].timeout_secs, 120);
        assert_eq!(config.instances[1].app, StarrApp::Lidarr);
        assert!(!config.instances[1].enabled);
    }

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8484);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.state.root.to_str().unwrap(), "state");
        assert!(!config.sweep.enabled);
        assert!(config.instances.is_empty());
    }

    #[test]
    fn test_deserialize_instance_missing_name_fails() {
        let toml = r#"
[[instance]]
app = "radarr"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_hides_api_keys() {
        let toml = r#"
[[instance]]
app = "sonarr"
name = "sonarr"
api_url = "http://localhost:8989"
api_key = "very-secret"
enabled = true

[[instance]]
app = "readarr"
name = "readarr"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let sanitized = SanitizedConfig::from(&config);

        assert_eq!(sanitized.instances.len(), 2);
        assert!(sanitized.instances[0].api_key_configured);
        assert!(!sanitized.instances[1].api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("very-secret"));
    }
}
