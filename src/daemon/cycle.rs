//! One playback of the keep-alive sound.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::shutdown::ShutdownSignal;
use crate::playback::{PlaybackError, PlaybackPort};

// ============================================================================
// Trigger / CycleOutcome
// ============================================================================

/// What started a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The immediate play at startup
    Initial,
    /// A recurring timer fire
    Timer,
    /// "Play sound now" from the status surface
    Replay,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Initial => write!(f, "initial"),
            Trigger::Timer => write!(f, "timer"),
            Trigger::Replay => write!(f, "replay"),
        }
    }
}

/// Result of one cycle. Failures are reported, never acted upon.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Shutdown was already requested; nothing was played
    Skipped,
    Played,
    Failed(PlaybackError),
}

impl CycleOutcome {
    pub fn is_played(&self) -> bool {
        matches!(self, Self::Played)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    pub fn error(&self) -> Option<&PlaybackError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

// ============================================================================
// CycleCounts
// ============================================================================

/// Snapshot of how many cycles ended each way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleCounts {
    pub played: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl CycleCounts {
    pub fn total(&self) -> usize {
        self.played + self.failed + self.skipped
    }
}

#[derive(Debug, Default)]
struct CycleStats {
    played: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
}

// ============================================================================
// PlaybackCycle
// ============================================================================

/// Plays the configured sound through the active port.
///
/// Cheap to clone; clones share the counters. Every run checks the shutdown
/// signal first, so late timer ticks and late replay requests play nothing.
#[derive(Clone)]
pub struct PlaybackCycle {
    port: Arc<dyn PlaybackPort>,
    sound_path: Arc<PathBuf>,
    shutdown: ShutdownSignal,
    stats: Arc<CycleStats>,
}

impl fmt::Debug for PlaybackCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackCycle")
            .field("engine", &self.port.name())
            .field("sound_path", &self.sound_path)
            .field("counts", &self.counts())
            .finish()
    }
}

impl PlaybackCycle {
    pub fn new(
        port: Arc<dyn PlaybackPort>,
        sound_path: impl Into<PathBuf>,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            port,
            sound_path: Arc::new(sound_path.into()),
            shutdown,
            stats: Arc::default(),
        }
    }

    pub fn sound_path(&self) -> &Path {
        &self.sound_path
    }

    pub fn counts(&self) -> CycleCounts {
        CycleCounts {
            played: self.stats.played.load(Ordering::SeqCst),
            failed: self.stats.failed.load(Ordering::SeqCst),
            skipped: self.stats.skipped.load(Ordering::SeqCst),
        }
    }

    /// Plays the sound once on the blocking pool and waits for it to finish.
    pub async fn run(&self, trigger: Trigger) -> CycleOutcome {
        if self.shutdown.is_requested() {
            self.stats.skipped.fetch_add(1, Ordering::SeqCst);
            debug!(%trigger, "Shutdown requested, skipping playback");
            return CycleOutcome::Skipped;
        }

        info!(%trigger, path = %self.sound_path.display(), "Playing sound");

        let port = Arc::clone(&self.port);
        let engine = port.name().to_string();
        let path = Arc::clone(&self.sound_path);
        let result = tokio::task::spawn_blocking(move || port.play(&path)).await;

        let outcome = match result {
            Ok(Ok(())) => {
                self.stats.played.fetch_add(1, Ordering::SeqCst);
                info!("Sound playback completed");
                CycleOutcome::Played
            }
            Ok(Err(e)) => {
                self.stats.failed.fetch_add(1, Ordering::SeqCst);
                warn!(error = %e, hint = e.suggestion(), "Error playing sound");
                CycleOutcome::Failed(e)
            }
            Err(join_error) => {
                self.stats.failed.fetch_add(1, Ordering::SeqCst);
                warn!(error = %join_error, "Playback task did not complete");
                CycleOutcome::Failed(PlaybackError::EngineFailed {
                    engine,
                    detail: join_error.to_string(),
                })
            }
        };

        if self.shutdown.is_requested() {
            debug!(%trigger, "Playback finished after shutdown was requested");
        }
        outcome
    }
}
