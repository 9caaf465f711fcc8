//! Sound playback port.
//!
//! This module provides the capability the scheduler uses to play the
//! keep-alive sound:
//!
//! - [`PlaybackPort`]: the port trait, synchronous by contract
//! - [`CommandPlayer`]: external command players (`aplay`, `afplay`)
//! - [`RodioPlayer`]: in-process decoding and output
//! - [`MockPlaybackPort`]: recording double for tests
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   PlaybackPort   │ ← selected once per platform
//! └────────┬─────────┘
//!          │
//!    ┌─────┴───────────────┬─────────────────┐
//!    ▼                     ▼                 ▼
//! ┌──────────┐     ┌──────────────┐   ┌─────────────┐
//! │  aplay   │     │    afplay    │   │    rodio    │
//! │ (Linux)  │     │   (macOS)    │   │  (Windows)  │
//! └──────────┘     └──────────────┘   └─────────────┘
//! ```

mod command;
mod device;
mod error;

pub use command::CommandPlayer;
pub use device::RodioPlayer;
pub use error::PlaybackError;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Trait for sound playback implementations.
///
/// Implementations must be safe to call from several threads at once: a
/// timer-driven cycle and a user replay request may overlap.
pub trait PlaybackPort: Send + Sync {
    /// Short engine name for log lines.
    fn name(&self) -> &str;

    /// Plays the file at `path` and returns once playback has finished.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::FileNotFound`] if `path` is not an existing
    /// file, or an engine error if rendering failed.
    fn play(&self, path: &Path) -> Result<(), PlaybackError>;
}

/// Checks that `path` names an existing file and returns its absolute form.
pub(crate) fn ensure_playable(path: &Path) -> Result<PathBuf, PlaybackError> {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    if !absolute.is_file() {
        return Err(PlaybackError::FileNotFound(absolute));
    }
    Ok(absolute)
}

// ============================================================================
// MockPlaybackPort
// ============================================================================

/// Mock playback port for testing.
///
/// Records every call, can be told to fail, and can simulate a slow engine
/// so tests can observe a cycle while it is in flight.
#[derive(Debug, Default)]
pub struct MockPlaybackPort {
    play_calls: Mutex<Vec<PathBuf>>,
    started: AtomicUsize,
    completed: AtomicUsize,
    should_fail: AtomicBool,
    play_duration: Mutex<Option<Duration>>,
}

impl MockPlaybackPort {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `play` call block for `duration` before returning.
    #[must_use]
    pub fn with_play_duration(self, duration: Duration) -> Self {
        *self.play_duration.lock().unwrap() = Some(duration);
        self
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Number of `play` calls that have started.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Number of `play` calls that have returned.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_calls.lock().unwrap().len()
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<PathBuf> {
        self.play_calls.lock().unwrap().clone()
    }
}

impl PlaybackPort for MockPlaybackPort {
    fn name(&self) -> &str {
        "mock"
    }

    fn play(&self, path: &Path) -> Result<(), PlaybackError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.play_calls.lock().unwrap().push(path.to_path_buf());

        let duration = *self.play_duration.lock().unwrap();
        if let Some(duration) = duration {
            std::thread::sleep(duration);
        }

        self.completed.fetch_add(1, Ordering::SeqCst);

        if self.should_fail.load(Ordering::SeqCst) {
            return Err(PlaybackError::EngineFailed {
                engine: "mock".to_string(),
                detail: "Mock failure".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_playable_missing() {
        let err = ensure_playable(Path::new("missing.wav")).unwrap_err();
        match err {
            PlaybackError::FileNotFound(path) => assert!(path.is_absolute()),
            other => panic!("Expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_ensure_playable_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_playable(dir.path()).is_err());
    }

    #[test]
    fn test_ensure_playable_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sound.wav");
        std::fs::write(&path, b"RIFF").unwrap();

        assert_eq!(ensure_playable(&path).unwrap(), path);
    }

    #[test]
    fn test_mock_records_calls() {
        let mock = MockPlaybackPort::new();
        mock.play(Path::new("a.wav")).unwrap();
        mock.play(Path::new("b.wav")).unwrap();

        assert_eq!(mock.play_count(), 2);
        assert_eq!(mock.started_count(), 2);
        assert_eq!(mock.completed_count(), 2);
        assert_eq!(
            mock.get_play_calls(),
            vec![PathBuf::from("a.wav"), PathBuf::from("b.wav")]
        );
    }

    #[test]
    fn test_mock_failure() {
        let mock = MockPlaybackPort::new();
        mock.set_should_fail(true);
        assert!(mock.play(Path::new("a.wav")).is_err());
        assert_eq!(mock.play_count(), 1);
    }

    #[test]
    fn test_ports_are_object_safe() {
        let ports: Vec<Box<dyn PlaybackPort>> = vec![
            Box::new(CommandPlayer::aplay()),
            Box::new(RodioPlayer::new()),
            Box::new(MockPlaybackPort::new()),
        ];
        let names: Vec<&str> = ports.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["aplay", "rodio", "mock"]);
    }
}
