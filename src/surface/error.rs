//! Status surface error types.

use thiserror::Error;

/// Errors raised while bringing up the status surface.
///
/// All of them are recoverable: the helper keeps running without a tray icon.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The platform has no status surface.
    #[error("Status surface is not supported on this platform")]
    Unsupported,

    /// The native icon or menu could not be created.
    #[error("Failed to create tray icon: {0}")]
    Initialization(String),

    /// The UI thread could not be started or died during startup.
    #[error("Status surface thread failed: {0}")]
    Thread(String),
}
