//! Controller configuration consumed by the IPAM.
//!
//! Only the hybrid overlay switch matters here: when enabled, one more
//! address at the start of every host subnet is kept for the hybrid overlay
//! gateway port.

use crate::models::{HYBRID_OVERLAY_OFFSET, MANAGEMENT_PORT_OFFSET};
use lazy_static::lazy_static;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

/// Environment variable overriding [`HybridOverlayConfig::enabled`].
pub const HYBRID_OVERLAY_ENV: &str = "OVN_HYBRID_OVERLAY_ENABLE";

/// A configuration that can be read and replaced at runtime.
pub type SharedConfig = Arc<RwLock<Config>>;

lazy_static! {
    static ref GLOBAL_CONFIG: SharedConfig = Arc::new(RwLock::new(Config::default()));
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct HybridOverlayConfig {
    /// Reserve an address per host subnet for the hybrid overlay gateway.
    #[serde(default)]
    pub enabled: bool,
}

/// Controller configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub hybrid_overlay: HybridOverlayConfig,
}

impl Config {
    /// Number of addresses after the network address excluded from allocation.
    ///
    /// Everything up to the last logical switch port address in use: the
    /// management port, or the hybrid overlay gateway when enabled.
    pub fn reserved_ips(&self) -> u128 {
        if self.hybrid_overlay.enabled {
            HYBRID_OVERLAY_OFFSET
        } else {
            MANAGEMENT_PORT_OFFSET
        }
    }

    /// Apply overrides from the environment.
    pub fn apply_env(&mut self) -> Result<(), Box<dyn Error>> {
        if let Ok(value) = std::env::var(HYBRID_OVERLAY_ENV) {
            self.hybrid_overlay.enabled = parse_bool(&value)
                .ok_or_else(|| format!("Invalid boolean for {HYBRID_OVERLAY_ENV}: {value}"))?;
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}

/// Parse a configuration from JSON, reporting the path of a bad field.
pub fn parse_config(json: &str) -> Result<Config, Box<dyn Error>> {
    let de = &mut serde_json::Deserializer::from_str(json);
    let config: Config = serde_path_to_error::deserialize(de)
        .map_err(|e| format!("Error parsing config at {}: {}", e.path(), e.inner()))?;
    Ok(config)
}

/// Load the configuration: defaults, then the optional JSON file, then the environment.
pub fn load_config(config_file: Option<&str>) -> Result<Config, Box<dyn Error>> {
    let mut config = match config_file {
        Some(file) => {
            log::info!("Reading config file: {file}");
            let json = std::fs::read_to_string(file)
                .map_err(|e| format!("Error reading config file {file}: {e}"))?;
            parse_config(&json)?
        }
        None => Config::default(),
    };
    config.apply_env()?;
    log::debug!("Loaded config: {config:?}");
    Ok(config)
}

/// Handle to the process-wide configuration.
pub fn global_config() -> SharedConfig {
    Arc::clone(&GLOBAL_CONFIG)
}

/// Replace the process-wide configuration.
pub fn set_global_config(config: Config) {
    *GLOBAL_CONFIG.write() = config;
}

/// Wrap a configuration in a handle of its own, detached from the global one.
pub fn shared(config: Config) -> SharedConfig {
    Arc::new(RwLock::new(config))
}
