//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing the configuration file.
///
/// Loading never surfaces these to the scheduler: [`ConfigStore::load`]
/// logs them and falls back to defaults. Saving returns them to the caller.
///
/// [`ConfigStore::load`]: super::ConfigStore::load
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Failed to read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid configuration JSON.
    #[error("Failed to parse configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The configuration could not be serialized.
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The file (or its directory) could not be written.
    #[error("Failed to write configuration file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Returns true if the file content, not the filesystem, is at fault.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Read { .. } => "Check that the configuration file is readable",
            Self::Parse { .. } => {
                "Fix the JSON syntax, or delete the file to regenerate the defaults"
            }
            Self::Serialize(_) => "Report this as a bug",
            Self::Write { .. } => "Check that the configuration directory is writable",
        }
    }
}
