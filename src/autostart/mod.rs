//! Launch-at-login registration.
//!
//! This module provides the [`AutostartPort`] trait and one implementation
//! per OS family:
//!
//! - [`RunKeyAutostart`]: Windows `Run` registry value
//! - [`LaunchAgent`]: macOS LaunchAgent plist
//! - [`XdgAutostart`]: Linux XDG autostart desktop entry
//! - [`NoopAutostart`]: every other platform
//!
//! All mutating operations are idempotent. Failures are reported to the
//! caller and never stop the scheduler.
//!
//! # Example
//!
//! ```no_run
//! use standby_guard::autostart::{AutostartPort, LaunchCommand, XdgAutostart};
//!
//! let port = XdgAutostart::new(LaunchCommand::new("/usr/local/bin/standby-guard"));
//! if !port.is_enabled() {
//!     port.enable()?;
//! }
//! # Ok::<(), standby_guard::autostart::AutostartError>(())
//! ```

pub mod error;
pub mod launch_agent;
pub mod run_key;
pub mod xdg;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub use error::{AutostartError, Result};
pub use launch_agent::{LaunchAgent, LaunchAgentPlist};
pub use run_key::RunKeyAutostart;
pub use xdg::XdgAutostart;

/// Trait for launch-at-login registration.
pub trait AutostartPort: Send + Sync {
    /// Returns false for the no-op fallback.
    fn is_supported(&self) -> bool;

    /// Returns true if the helper is registered to start at login.
    fn is_enabled(&self) -> bool;

    /// Registers the helper. Calling this when already registered is not an error.
    fn enable(&self) -> Result<()>;

    /// Removes the registration. Calling this when not registered is a no-op.
    fn disable(&self) -> Result<()>;

    /// Flips the registration and returns the new state.
    fn toggle(&self) -> Result<bool> {
        if self.is_enabled() {
            self.disable()?;
            Ok(false)
        } else {
            self.enable()?;
            Ok(true)
        }
    }
}

// ============================================================================
// LaunchCommand
// ============================================================================

/// The command line an autostart entry runs at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    /// Absolute path to the executable
    pub program: PathBuf,
    /// Arguments passed after the program
    pub args: Vec<String>,
}

impl LaunchCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Resolves the running executable, optionally pinning a config file.
    ///
    /// # Errors
    /// Returns an error if the executable path cannot be determined.
    pub fn current_exe(config_path: Option<&std::path::Path>) -> std::io::Result<Self> {
        let program = std::env::current_exe()?;
        let command = Self::new(program);
        Ok(match config_path {
            Some(path) => {
                let path = std::path::absolute(path)?;
                command.with_args(["--config".to_string(), path.to_string_lossy().into_owned()])
            }
            None => command,
        })
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

// ============================================================================
// NoopAutostart
// ============================================================================

/// Fallback for platforms without an autostart mechanism.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAutostart;

impl AutostartPort for NoopAutostart {
    fn is_supported(&self) -> bool {
        false
    }

    fn is_enabled(&self) -> bool {
        false
    }

    fn enable(&self) -> Result<()> {
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        Ok(())
    }

    fn toggle(&self) -> Result<bool> {
        Ok(false)
    }
}

// ============================================================================
// MockAutostartPort
// ============================================================================

/// Mock autostart port for testing.
#[derive(Debug, Default)]
pub struct MockAutostartPort {
    enabled: AtomicBool,
    should_fail: AtomicBool,
    enable_calls: AtomicUsize,
    disable_calls: AtomicUsize,
}

impl MockAutostartPort {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            ..Self::default()
        }
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn enable_calls(&self) -> usize {
        self.enable_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn disable_calls(&self) -> usize {
        self.disable_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<()> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(AutostartError::RegistryUpdate("Mock failure".to_string()));
        }
        Ok(())
    }
}

impl AutostartPort for MockAutostartPort {
    fn is_supported(&self) -> bool {
        true
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn enable(&self) -> Result<()> {
        self.enable_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.enabled.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        self.disable_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.enabled.store(false, Ordering::SeqCst);
        Ok(())
    }
}
