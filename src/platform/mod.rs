//! Host platform detection and port selection.
//!
//! The process decides once, at startup, which implementation of each port
//! it runs with. Detection maps the compile-time OS identifier to a
//! [`Platform`]; the `select_*` functions in [`select`] map a `Platform` to
//! one concrete port. Nothing downstream of selection branches on the OS.

pub mod select;

pub use select::{select_autostart_port, select_playback_port, select_status_surface};

use std::fmt;

// ============================================================================
// Platform
// ============================================================================

/// Operating system families the ports know how to serve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Microsoft Windows
    Windows,
    /// Apple macOS
    MacOs,
    /// Linux (any desktop distribution)
    Linux,
    /// Anything else, carrying the raw OS identifier
    Other(String),
}

impl Platform {
    /// Detects the platform this binary was built for.
    ///
    /// Reads `std::env::consts::OS`, which is a compile-time constant, so
    /// this never touches the filesystem.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_os_str(std::env::consts::OS)
    }

    /// Maps an OS identifier (as found in `std::env::consts::OS`).
    #[must_use]
    pub fn from_os_str(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            other => Platform::Other(other.to_string()),
        }
    }

    /// Returns the identifier used in log lines and error messages.
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Windows => "windows",
            Platform::MacOs => "macos",
            Platform::Linux => "linux",
            Platform::Other(name) => name,
        }
    }

    /// Returns true for the three families with dedicated port variants.
    pub fn is_known(&self) -> bool {
        !matches!(self, Platform::Other(_))
    }

    /// Name shown in the autostart menu entry ("Start with Windows", ...).
    pub fn display_name(&self) -> &str {
        match self {
            Platform::Windows => "Windows",
            Platform::MacOs => "macOS",
            Platform::Linux => "Linux",
            Platform::Other(name) => name,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
