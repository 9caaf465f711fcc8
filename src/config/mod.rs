//! Persisted settings and the effective configuration.
//!
//! This module provides:
//! - [`AppConfig`]: the on-disk settings, PascalCase JSON keys
//! - [`EffectiveConfig`]: the resolved snapshot the coordinator runs with
//! - [`ConfigStore`]: the load/save collaborator, with [`JsonConfigStore`]
//!   for the real file and [`MemoryConfigStore`] for tests
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use standby_guard::config::AppConfig;
//!
//! let effective = AppConfig::default().resolve(Path::new("/etc/standby-guard"));
//! assert_eq!(effective.delay.as_secs(), 540);
//! assert_eq!(effective.sound_path, Path::new("/etc/standby-guard/sound.wav"));
//! ```

pub mod error;
pub mod store;

pub use error::ConfigError;
pub use store::{JsonConfigStore, DEFAULT_CONFIG_FILE};

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ============================================================================
// AppConfig
// ============================================================================

fn default_sound_file_path() -> String {
    "sound.wav".to_string()
}

fn default_minimize_to_tray() -> bool {
    true
}

fn default_delay_seconds() -> u64 {
    AppConfig::DEFAULT_DELAY_SECONDS
}

/// Settings as stored in `config.json`.
///
/// Missing keys take their defaults; unknown keys are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct AppConfig {
    /// Sound to play, relative to the config file's directory unless absolute.
    #[serde(default = "default_sound_file_path")]
    pub sound_file_path: String,

    /// Whether to show the status surface.
    #[serde(default = "default_minimize_to_tray")]
    pub minimize_to_tray: bool,

    /// Seconds between two plays.
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: u64,

    /// Whether the helper should be registered to start at login.
    #[serde(default)]
    pub start_with_system: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sound_file_path: default_sound_file_path(),
            minimize_to_tray: default_minimize_to_tray(),
            delay_seconds: default_delay_seconds(),
            start_with_system: false,
        }
    }
}

impl AppConfig {
    /// Nine minutes: below the usual ten-minute soundbar standby timeout.
    pub const DEFAULT_DELAY_SECONDS: u64 = 540;

    /// One day. Longer delays are clamped to this.
    pub const MAX_DELAY_SECONDS: u64 = 86_400;

    /// Resolves the settings against the directory holding the config file.
    pub fn resolve(&self, base_dir: &Path) -> EffectiveConfig {
        let delay_seconds = if self.delay_seconds == 0 {
            tracing::warn!(
                default = Self::DEFAULT_DELAY_SECONDS,
                "DelaySeconds must be positive, using the default"
            );
            Self::DEFAULT_DELAY_SECONDS
        } else if self.delay_seconds > Self::MAX_DELAY_SECONDS {
            tracing::warn!(
                max = Self::MAX_DELAY_SECONDS,
                "DelaySeconds is too large, using the maximum"
            );
            Self::MAX_DELAY_SECONDS
        } else {
            self.delay_seconds
        };

        let sound_path = PathBuf::from(&self.sound_file_path);
        let sound_path = if sound_path.is_absolute() {
            sound_path
        } else {
            base_dir.join(sound_path)
        };

        EffectiveConfig {
            sound_path,
            delay: Duration::from_secs(delay_seconds),
            status_surface_enabled: self.minimize_to_tray,
            autostart_desired: self.start_with_system,
        }
    }
}

// ============================================================================
// EffectiveConfig
// ============================================================================

/// Immutable snapshot the coordinator runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub sound_path: PathBuf,
    /// Greater than zero and at most [`AppConfig::MAX_DELAY_SECONDS`].
    pub delay: Duration,
    pub status_surface_enabled: bool,
    pub autostart_desired: bool,
}

/// Command-line overrides for one run. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOverrides {
    pub delay: Option<Duration>,
    pub sound_path: Option<PathBuf>,
    pub disable_surface: bool,
}

impl EffectiveConfig {
    #[must_use]
    pub fn with_overrides(mut self, overrides: &RunOverrides) -> Self {
        if let Some(delay) = overrides.delay.filter(|d| !d.is_zero()) {
            self.delay = delay.min(Duration::from_secs(AppConfig::MAX_DELAY_SECONDS));
        }
        if let Some(path) = &overrides.sound_path {
            self.sound_path = path.clone();
        }
        if overrides.disable_surface {
            self.status_surface_enabled = false;
        }
        self
    }
}

// ============================================================================
// ConfigStore
// ============================================================================

/// Load/save collaborator for [`AppConfig`].
pub trait ConfigStore: Send + Sync {
    /// Returns the stored settings, or defaults if they cannot be read.
    fn load(&self) -> AppConfig;

    /// Persists `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings could not be written.
    fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    /// Directory relative sound paths resolve against.
    fn base_dir(&self) -> PathBuf;
}

/// In-memory store for testing.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: Mutex<AppConfig>,
    save_calls: AtomicUsize,
    should_fail: AtomicBool,
}

impl MemoryConfigStore {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Mutex::new(config),
            ..Self::default()
        }
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn current(&self) -> AppConfig {
        self.config.lock().unwrap().clone()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> AppConfig {
        self.current()
    }

    fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(ConfigError::Write {
                path: PathBuf::from("memory"),
                source: std::io::Error::other("Mock failure"),
            });
        }
        *self.config.lock().unwrap() = config.clone();
        Ok(())
    }

    fn base_dir(&self) -> PathBuf {
        PathBuf::from(".")
    }
}
