//! Config command and configuration loading shared by every command.

use std::path::PathBuf;

use anyhow::Result;
use portpilot_core::{Config, ConfigStore};
use tracing::warn;

/// Store for `--config`, or the default `~/.portpilot.yaml`.
pub fn store(path: Option<PathBuf>) -> Option<ConfigStore> {
    match path {
        Some(path) => Some(ConfigStore::with_path(path)),
        None => match ConfigStore::new() {
            Ok(store) => Some(store),
            Err(e) => {
                warn!(error = %e, "no config location, using defaults");
                None
            }
        },
    }
}

/// Load the configuration, falling back to defaults on any error.
pub async fn load(store: Option<&ConfigStore>) -> Config {
    let Some(store) = store else {
        return Config::default();
    };
    match store.load().await {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %store.path().display(), error = %e, "config error, using defaults");
            eprintln!("Warning: config error: {}", e);
            Config::default()
        }
    }
}

/// Print the effective configuration.
pub fn show(config: &Config, store: Option<&ConfigStore>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    if let Some(store) = store {
        println!("# {}", store.path().display());
    }
    print!("{}", config.to_yaml()?);
    Ok(())
}
