//! Standby Guard Library
//!
//! This library provides the core functionality for the standby-guard CLI,
//! a background helper that keeps an idle soundbar awake by playing a short
//! sound at a fixed interval. It includes:
//! - Lifecycle coordinator, recurring timer and shutdown handling
//! - Sound playback per OS family (`aplay`, `afplay`, rodio)
//! - Start-at-login registration per OS family
//! - Status surface with tray icon (Windows only)
//! - JSON configuration file with defaults
//! - CLI command parsing and display utilities

pub mod autostart;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod platform;
pub mod playback;
pub mod surface;

// Re-export commonly used types for convenience
pub use config::{AppConfig, ConfigError, ConfigStore, EffectiveConfig, JsonConfigStore};

pub use daemon::{
    Coordinator, CycleCounts, ExitReport, LifecycleState, Ports, ShutdownSignal, ShutdownSource,
};

pub use platform::Platform;

// Re-export port types
pub use autostart::{AutostartError, AutostartPort, LaunchCommand, MockAutostartPort};
pub use playback::{MockPlaybackPort, PlaybackError, PlaybackPort};
pub use surface::{MockStatusSurface, StatusSurfacePort, SurfaceError, SurfaceEvent};
