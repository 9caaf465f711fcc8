//! JSON file backed configuration store.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{AppConfig, ConfigError, ConfigStore};

/// File name used when no `--config` path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Reads and writes [`AppConfig`] as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl Default for JsonConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE)
    }
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file without any fallback.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn read(&self) -> Result<AppConfig, ConfigError> {
        let content = fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(config).map_err(ConfigError::Serialize)?;
        fs::write(&self.path, json).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> AppConfig {
        if !self.path.exists() {
            info!(
                path = %self.path.display(),
                "Configuration file not found, creating default config"
            );
            match self.write(&AppConfig::default()) {
                Ok(()) => {
                    info!(path = %self.path.display(), "Default configuration created");
                    info!("Please update the configuration file with your desired settings");
                }
                Err(e) => warn!("{}", e),
            }
            return AppConfig::default();
        }

        match self.read() {
            Ok(config) => config,
            Err(e) => {
                warn!("{}", e);
                info!("Using default configuration");
                AppConfig::default()
            }
        }
    }

    fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        self.write(config)?;
        info!(path = %self.path.display(), "Configuration saved");
        Ok(())
    }

    fn base_dir(&self) -> PathBuf {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::path::absolute(&dir).unwrap_or(dir)
    }
}
