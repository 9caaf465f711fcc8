//! Single-fire, process-wide shutdown signal.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

// ============================================================================
// ShutdownSource
// ============================================================================

/// What asked the process to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShutdownSource {
    /// Ctrl+C, SIGINT or SIGTERM
    Interrupt,
    /// Console window closed, or SIGHUP
    WindowClose,
    /// "Exit" chosen from the status surface
    StatusSurface,
}

impl fmt::Display for ShutdownSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownSource::Interrupt => write!(f, "interrupt"),
            ShutdownSource::WindowClose => write!(f, "window close"),
            ShutdownSource::StatusSurface => write!(f, "status surface exit"),
        }
    }
}

// ============================================================================
// ShutdownSignal
// ============================================================================

#[derive(Debug, Default)]
struct Inner {
    requested: AtomicBool,
    source: OnceLock<ShutdownSource>,
    token: CancellationToken,
}

/// Transitions from not-requested to requested exactly once.
///
/// Clones share the same state. Concurrent [`request`](Self::request) calls
/// race on a compare-and-set; only the winner records its source.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown. Returns true if this call performed the transition.
    pub fn request(&self, source: ShutdownSource) -> bool {
        let won = self
            .inner
            .requested
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        if won {
            let _ = self.inner.source.set(source);
            tracing::info!(%source, "Shutdown requested");
            self.inner.token.cancel();
        } else {
            tracing::debug!(%source, "Shutdown already requested");
        }
        won
    }

    pub fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::Acquire)
    }

    /// The source that won the race, once shutdown was requested.
    pub fn source(&self) -> Option<ShutdownSource> {
        self.inner.source.get().copied()
    }

    /// Resolves once shutdown has been requested. Returns immediately afterwards.
    pub async fn wait(&self) {
        self.inner.token.cancelled().await;
    }
}
