//! Playback error types.
//!
//! Every playback failure except [`PlaybackError::UnsupportedPlatform`] is
//! recoverable: the scheduler logs it and tries again on the next cycle.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while playing the keep-alive sound.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The sound file does not exist or is not a regular file.
    #[error("Sound file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The playback engine (external command or audio device) could not be started.
    #[error("Playback engine '{engine}' is unavailable: {reason}")]
    EngineUnavailable {
        /// Engine name (e.g. "aplay")
        engine: String,
        /// Why it could not be started
        reason: String,
    },

    /// The playback engine ran but reported a failure.
    #[error("Playback engine '{engine}' failed: {detail}")]
    EngineFailed {
        /// Engine name (e.g. "afplay")
        engine: String,
        /// Exit status and captured diagnostics
        detail: String,
    },

    /// The sound file could not be decoded.
    #[error("Failed to decode sound file: {0}")]
    Decode(String),

    /// No port implementation exists for the host operating system.
    #[error("Audio playback is not supported on this operating system ({0})")]
    UnsupportedPlatform(String),
}

impl PlaybackError {
    /// Returns true if the error concerns the sound file itself.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::Decode(_))
    }

    /// Returns true if the error concerns the playback engine.
    #[must_use]
    pub fn is_engine_error(&self) -> bool {
        matches!(
            self,
            Self::EngineUnavailable { .. } | Self::EngineFailed { .. }
        )
    }

    /// Returns true if the process cannot continue.
    ///
    /// Only platform selection produces a fatal error; everything raised
    /// while playing is retried by the next scheduled cycle.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnsupportedPlatform(_))
    }

    /// Returns a short hint for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::FileNotFound(_) => "Check SoundFilePath in the configuration file",
            Self::EngineUnavailable { .. } => {
                "Install the playback tool (aplay is part of alsa-utils) or connect an audio device"
            }
            Self::EngineFailed { .. } => "Check that the output device is connected and powered",
            Self::Decode(_) => "Use an uncompressed WAV file",
            Self::UnsupportedPlatform(_) => "Run on Windows, macOS or Linux",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlaybackError::FileNotFound(PathBuf::from("missing.wav"));
        assert!(err.to_string().contains("missing.wav"));

        let err = PlaybackError::EngineUnavailable {
            engine: "aplay".to_string(),
            reason: "not found".to_string(),
        };
        assert!(err.to_string().contains("aplay"));
        assert!(err.to_string().contains("not found"));

        let err = PlaybackError::EngineFailed {
            engine: "afplay".to_string(),
            detail: "exit status 1".to_string(),
        };
        assert!(err.to_string().contains("exit status 1"));

        let err = PlaybackError::UnsupportedPlatform("freebsd".to_string());
        assert!(err.to_string().contains("freebsd"));
    }

    #[test]
    fn test_classification() {
        assert!(PlaybackError::FileNotFound(PathBuf::new()).is_file_error());
        assert!(PlaybackError::Decode("x".into()).is_file_error());
        assert!(!PlaybackError::Decode("x".into()).is_engine_error());

        let failed = PlaybackError::EngineFailed {
            engine: "aplay".into(),
            detail: "x".into(),
        };
        assert!(failed.is_engine_error());
        assert!(!failed.is_fatal());
    }

    #[test]
    fn test_only_unsupported_platform_is_fatal() {
        assert!(PlaybackError::UnsupportedPlatform("x".into()).is_fatal());
        assert!(!PlaybackError::FileNotFound(PathBuf::new()).is_fatal());
        assert!(!PlaybackError::Decode("x".into()).is_fatal());
    }

    #[test]
    fn test_suggestion() {
        assert!(PlaybackError::FileNotFound(PathBuf::new())
            .suggestion()
            .contains("SoundFilePath"));
        assert!(PlaybackError::UnsupportedPlatform("x".into())
            .suggestion()
            .contains("Linux"));
    }
}
