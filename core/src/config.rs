//! Persistent defaults for filters and columns.
//!
//! Stores configuration in JSON format at `~/.pvw/config.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::{Column, FilterSettings};
use crate::error::{Error, Result};

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Keep CLOSED connections.
    #[serde(default)]
    pub show_closed: bool,

    /// Keep only LISTEN connections.
    #[serde(default)]
    pub listen_only: bool,

    /// Disable process termination in the interactive view.
    #[serde(default)]
    pub read_only: bool,

    /// Ports to filter by.
    #[serde(default)]
    pub ports: Vec<String>,

    /// Display columns, in order. `None` uses the built-in selection.
    #[serde(default)]
    pub columns: Option<Vec<Column>>,
}

impl Config {
    /// Filter settings described by this configuration.
    pub fn to_settings(&self) -> FilterSettings {
        let settings = FilterSettings::new()
            .with_ports(self.ports.iter().cloned())
            .with_show_closed(self.show_closed)
            .with_listen_only(self.listen_only);

        match &self.columns {
            Some(columns) => settings.with_columns(columns.iter().copied()),
            None => settings,
        }
    }

    /// Capture the persistable part of the given settings.
    pub fn from_settings(settings: &FilterSettings, read_only: bool) -> Self {
        Self {
            show_closed: settings.show_closed,
            listen_only: settings.listen_only,
            read_only,
            ports: settings.port_filter.iter().cloned().collect(),
            columns: Some(settings.columns.clone()),
        }
    }
}

/// Configuration store.
///
/// Handles reading and writing configuration to `~/.pvw/config.json`.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.pvw/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        Ok(Self {
            config_path: home.join(".pvw").join("config.json"),
        })
    }

    /// Create a config store with a custom path (for testing).
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Path of the configuration file.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, config: &Config) -> Result<()> {
        if let Some(config_dir) = self.config_path.parent() {
            fs::create_dir_all(config_dir)
                .await
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(config)?;

        // Write atomically by writing to temp file then renaming
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }
}
