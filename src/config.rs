//! Configuration
//!
//! Loads from `~/.config/winctl/config.toml`, auto-generating a default
//! file on first run. Everything here has a working default; the file
//! exists so deployments can pin a backend or run under a private bus name.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::dbus;

/// Which compositor backend to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// EWMH over the X11 session
    X11,
    /// In-memory window table (dry runs, tests)
    Headless,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    /// Well-known name to claim on the session bus
    pub bus_name: String,
    /// Default tracing filter; `RUST_LOG` overrides it
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::X11,
            bus_name: dbus::BUS_NAME.to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            if let Err(e) = Self::save_default(&config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse config file")?;

        info!("Configuration loaded from {:?}", config_path);

        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("winctl");

        Ok(config_dir.join("config.toml"))
    }

    fn save_default(path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let default_config = Self::default();
        let toml_string = toml::to_string_pretty(&default_config)
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string)
            .context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let default = Config::default();
        let text = toml::to_string_pretty(&default).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.backend, Backend::X11);
        assert_eq!(parsed.bus_name, dbus::BUS_NAME);
        assert_eq!(parsed.log_filter, "info");
    }

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("backend = \"headless\"").unwrap();
        assert_eq!(parsed.backend, Backend::Headless);
        assert_eq!(parsed.bus_name, dbus::BUS_NAME);
        assert_eq!(parsed.log_filter, "info");
    }
}
