//! Server configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::Path;

use anyhow::{Context, Result};
use rand::Rng;
use serde::Deserialize;

/// A device seeded into the registry at startup. Real device handlers are
/// out of scope; devices configured here are logged, not
/// actually controlled.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    pub id: String,
    pub name: String,
}

/// Server configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Stable hub identity. 32 hex characters preferred;
    /// generated once and should be persisted across restarts so Echo's
    /// cached pairing stays valid.
    /// Override: `BRIDGE_HUB_ID`
    pub hub_id: String,

    /// Port to bind the HTTP server to.
    /// Override: `BRIDGE_BIND_PORT`
    pub bind_port: u16,

    /// Enables verbose per-request logging.
    /// Override: `BRIDGE_DEBUG`
    pub debug: bool,

    pub ad_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub shutdown_grace_secs: u64,
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,

    /// Virtual devices to seed into the in-memory registry at startup.
    pub devices: Vec<DeviceConfig>,
}

fn generate_hub_id() -> String {
    let mut rng = rand::thread_rng();
    (0..32)
        .map(|_| std::char::from_digit(rng.gen_range(0..16), 16).unwrap())
        .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hub_id: generate_hub_id(),
            bind_port: 80,
            debug: false,
            ad_interval_secs: 30,
            request_timeout_secs: 10,
            shutdown_grace_secs: 5,
            rate_limit_max: 100,
            rate_limit_window_secs: 900,
            devices: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a YAML file, then applies environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails to parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("BRIDGE_HUB_ID") {
            if !val.is_empty() {
                self.hub_id = val;
            }
        }
        if let Ok(val) = std::env::var("BRIDGE_BIND_PORT") {
            if let Ok(port) = val.parse() {
                self.bind_port = port;
            }
        }
        if let Ok(val) = std::env::var("BRIDGE_DEBUG") {
            if let Ok(debug) = val.parse() {
                self.debug = debug;
            }
        }
    }

    /// Converts to `bridge-core`'s `Config` type.
    #[must_use]
    pub fn to_core_config(&self) -> bridge_core::Config {
        bridge_core::Config {
            port: self.bind_port,
            debug: self.debug,
            ad_interval_secs: self.ad_interval_secs,
            request_timeout_secs: self.request_timeout_secs,
            shutdown_grace_secs: self.shutdown_grace_secs,
            rate_limit_max: self.rate_limit_max,
            rate_limit_window_secs: self.rate_limit_window_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hub_id_is_32_lowercase_hex_chars() {
        let config = ServerConfig::default();
        assert_eq!(config.hub_id.len(), 32);
        assert!(config.hub_id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn to_core_config_carries_fields_through() {
        let config = ServerConfig {
            bind_port: 8080,
            ..ServerConfig::default()
        };
        let core = config.to_core_config();
        assert_eq!(core.port, 8080);
    }
}
