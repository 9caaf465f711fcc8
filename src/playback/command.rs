//! Playback through an external command-line player.
//!
//! Linux uses `aplay` (alsa-utils) and macOS uses `afplay`. Both block until
//! the file has been rendered, which gives the synchronous contract the
//! scheduler relies on. Each call spawns its own child process, so
//! overlapping cycles never share engine state.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use super::error::PlaybackError;
use super::{ensure_playable, PlaybackPort};

/// Plays sound files by running `<program> <absolute path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlayer {
    program: String,
}

impl CommandPlayer {
    /// Creates a player for an arbitrary command.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// ALSA command-line player (Linux).
    #[must_use]
    pub fn aplay() -> Self {
        Self::new("aplay")
    }

    /// Core Audio command-line player (macOS).
    #[must_use]
    pub fn afplay() -> Self {
        Self::new("afplay")
    }

    /// Returns the program this player runs.
    pub fn program(&self) -> &str {
        &self.program
    }

    fn spawn_error(&self, err: io::Error) -> PlaybackError {
        let reason = if err.kind() == io::ErrorKind::NotFound {
            format!("'{}' was not found in PATH", self.program)
        } else {
            err.to_string()
        };
        PlaybackError::EngineUnavailable {
            engine: self.program.clone(),
            reason,
        }
    }
}

impl PlaybackPort for CommandPlayer {
    fn name(&self) -> &str {
        &self.program
    }

    fn play(&self, path: &Path) -> Result<(), PlaybackError> {
        let absolute = ensure_playable(path)?;

        debug!(program = %self.program, path = %absolute.display(), "Spawning player");

        let output = Command::new(&self.program)
            .arg(&absolute)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = match stderr.trim() {
                "" => output.status.to_string(),
                msg => format!("{}: {}", output.status, msg),
            };
            return Err(PlaybackError::EngineFailed {
                engine: self.program.clone(),
                detail,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_constructors() {
        assert_eq!(CommandPlayer::aplay().program(), "aplay");
        assert_eq!(CommandPlayer::afplay().program(), "afplay");
        assert_eq!(CommandPlayer::new("paplay").name(), "paplay");
    }

    #[test]
    fn test_missing_file_is_reported_before_spawning() {
        let player = CommandPlayer::new("definitely-not-a-real-player-binary");
        let result = player.play(Path::new("/nonexistent/dir/missing.wav"));

        match result {
            Err(PlaybackError::FileNotFound(path)) => {
                assert!(path.ends_with("missing.wav"));
            }
            other => panic!("Expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_program_is_engine_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let sound = dir.path().join("sound.wav");
        std::fs::write(&sound, b"RIFF").unwrap();

        let player = CommandPlayer::new("definitely-not-a-real-player-binary");
        let err = player.play(&sound).unwrap_err();

        assert!(err.is_engine_error());
        assert!(matches!(err, PlaybackError::EngineUnavailable { .. }));
        assert!(err.to_string().contains("definitely-not-a-real-player-binary"));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_engine_failed() {
        let dir = tempfile::tempdir().unwrap();
        let sound: PathBuf = dir.path().join("sound.wav");
        std::fs::write(&sound, b"RIFF").unwrap();

        // `false` ignores its argument and exits with status 1.
        let player = CommandPlayer::new("false");
        let err = player.play(&sound).unwrap_err();

        match err {
            PlaybackError::EngineFailed { engine, .. } => assert_eq!(engine, "false"),
            other => panic!("Expected EngineFailed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_zero_exit_is_success() {
        let dir = tempfile::tempdir().unwrap();
        let sound = dir.path().join("sound.wav");
        std::fs::write(&sound, b"RIFF").unwrap();

        let player = CommandPlayer::new("true");
        assert!(player.play(&sound).is_ok());
    }
}
