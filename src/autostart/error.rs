//! Error types for autostart registration.

use std::io;
use thiserror::Error;

/// Autostart registration error type.
#[derive(Debug, Error)]
pub enum AutostartError {
    /// Home directory not found.
    #[error("Failed to get home directory")]
    HomeDirectoryNotFound,

    /// Failed to create the directory holding the registration entry.
    #[error("Failed to create directory: {0}")]
    DirectoryCreation(#[source] io::Error),

    /// Failed to write the registration entry.
    #[error("Failed to write autostart entry: {0}")]
    EntryWrite(#[source] io::Error),

    /// Failed to remove the registration entry.
    #[error("Failed to remove autostart entry: {0}")]
    EntryRemove(#[source] io::Error),

    /// Failed to set file permissions.
    #[error("Failed to set file permissions: {0}")]
    PermissionSet(#[source] io::Error),

    /// Failed to serialize plist.
    #[error("Failed to serialize plist: {0}")]
    PlistSerialize(#[source] plist::Error),

    /// Failed to convert plist to UTF-8 string.
    #[error("Failed to convert plist to UTF-8: {0}")]
    PlistUtf8(#[source] std::string::FromUtf8Error),

    /// Failed to execute the registry tool.
    #[error("Failed to execute reg: {0}")]
    RegistryExecution(String),

    /// The registry tool ran but rejected the change.
    #[error("Registry update failed: {0}")]
    RegistryUpdate(String),
}

/// Result type for autostart operations.
pub type Result<T> = std::result::Result<T, AutostartError>;

impl AutostartError {
    /// Returns true if the OS refused access to the registration.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::DirectoryCreation(e)
            | Self::EntryWrite(e)
            | Self::EntryRemove(e)
            | Self::PermissionSet(e) => e.kind() == io::ErrorKind::PermissionDenied,
            Self::RegistryUpdate(detail) => detail.contains("Access is denied"),
            _ => false,
        }
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        if self.is_permission_denied() {
            return "Check the permissions of your login items location";
        }
        match self {
            Self::HomeDirectoryNotFound => "Set the HOME environment variable",
            Self::RegistryExecution(_) => "Make sure reg.exe is available in PATH",
            Self::PlistSerialize(_) | Self::PlistUtf8(_) => "Report this as a bug",
            _ => "Retry, or register the helper manually in your login items",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_home_directory() {
        let err = AutostartError::HomeDirectoryNotFound;
        assert_eq!(err.to_string(), "Failed to get home directory");
    }

    #[test]
    fn test_error_display_io_variants() {
        let err = AutostartError::EntryWrite(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(err.to_string().contains("write autostart entry"));
        assert!(err.to_string().contains("denied"));

        let err = AutostartError::EntryRemove(io::Error::new(io::ErrorKind::Other, "busy"));
        assert!(err.to_string().contains("remove autostart entry"));
    }

    #[test]
    fn test_error_display_registry() {
        let err = AutostartError::RegistryUpdate("Access is denied.".to_string());
        assert!(err.to_string().contains("Access is denied."));

        let err = AutostartError::RegistryExecution("not found".to_string());
        assert!(err.to_string().contains("reg"));
    }

    #[test]
    fn test_permission_denied_detection() {
        let err = AutostartError::EntryWrite(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(err.is_permission_denied());
        assert!(err.suggestion().contains("permissions"));

        let err = AutostartError::RegistryUpdate("ERROR: Access is denied.".to_string());
        assert!(err.is_permission_denied());

        assert!(!AutostartError::HomeDirectoryNotFound.is_permission_denied());
        assert!(AutostartError::HomeDirectoryNotFound.suggestion().contains("HOME"));
    }

    #[test]
    fn test_error_source_is_preserved() {
        use std::error::Error as _;

        let err = AutostartError::DirectoryCreation(io::Error::new(io::ErrorKind::Other, "x"));
        assert!(err.source().is_some());
    }
}
