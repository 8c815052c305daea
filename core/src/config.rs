//! Configuration management for port groups and refresh settings.
//!
//! Stores configuration in YAML format at `~/.portpilot.yaml`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::error::{Error, Result};

/// File name of the configuration file, relative to the home directory.
pub const CONFIG_FILE_NAME: &str = ".portpilot.yaml";

/// Refresh interval used when none (or an invalid one) is configured.
pub const DEFAULT_REFRESH_INTERVAL: u64 = 2;

/// A named set of ports rendered in a shared colour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub ports: Vec<u16>,
    #[serde(default)]
    pub color: String,
}

/// Configuration data stored in YAML format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Port groups by name.
    #[serde(default)]
    pub groups: BTreeMap<String, Group>,

    /// Port scan refresh interval in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: i64,

    /// Render system-owned ports with normal colouring instead of dimmed.
    #[serde(default)]
    pub show_system_ports: bool,
}

fn default_refresh_interval() -> i64 {
    DEFAULT_REFRESH_INTERVAL as i64
}

impl Default for Config {
    fn default() -> Self {
        Self {
            groups: BTreeMap::new(),
            refresh_interval: default_refresh_interval(),
            show_system_ports: false,
        }
    }
}

impl Config {
    /// Parse YAML text. Empty input yields the defaults.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: Config = serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.normalize();
        Ok(config)
    }

    fn normalize(&mut self) {
        if self.refresh_interval < 1 {
            self.refresh_interval = default_refresh_interval();
        }
    }

    /// Refresh interval as a duration, never below one second.
    pub fn refresh_interval(&self) -> Duration {
        let secs = u64::try_from(self.refresh_interval)
            .ok()
            .filter(|s| *s >= 1)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL);
        Duration::from_secs(secs)
    }

    /// Name of the group containing `port`; the alphabetically first one wins.
    pub fn group_for_port(&self, port: u16) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, group)| group.ports.contains(&port))
            .map(|(name, _)| name.as_str())
    }

    /// Colour configured for a group.
    pub fn group_color(&self, name: &str) -> Option<&str> {
        self.groups
            .get(name)
            .map(|g| g.color.as_str())
            .filter(|c| !c.is_empty())
    }

    /// Serialize as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }
}

/// Configuration store for loading settings from disk.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.portpilot.yaml`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        Ok(Self {
            config_path: home.join(CONFIG_FILE_NAME),
        })
    }

    /// Create a config store with a custom path.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Get the configuration file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        Config::parse(&content)
    }
}
