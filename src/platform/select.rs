//! Port selection by platform.

use std::sync::Arc;

use super::Platform;
use crate::autostart::{
    AutostartPort, LaunchAgent, LaunchCommand, NoopAutostart, RunKeyAutostart, XdgAutostart,
};
use crate::playback::{CommandPlayer, PlaybackError, PlaybackPort, RodioPlayer};
use crate::surface::{NoopSurface, StatusSurfacePort};

/// Returns the playback engine for `platform`.
///
/// # Errors
///
/// Returns [`PlaybackError::UnsupportedPlatform`] when no engine exists for
/// the platform. This is the only fatal startup condition.
pub fn select_playback_port(platform: &Platform) -> Result<Arc<dyn PlaybackPort>, PlaybackError> {
    match platform {
        Platform::Linux => Ok(Arc::new(CommandPlayer::aplay())),
        Platform::MacOs => Ok(Arc::new(CommandPlayer::afplay())),
        Platform::Windows => Ok(Arc::new(RodioPlayer)),
        Platform::Other(name) => Err(PlaybackError::UnsupportedPlatform(name.clone())),
    }
}

/// Returns the autostart registration for `platform`, or a no-op.
pub fn select_autostart_port(platform: &Platform, command: LaunchCommand) -> Arc<dyn AutostartPort> {
    match platform {
        Platform::Windows => Arc::new(RunKeyAutostart::new(command)),
        Platform::MacOs => Arc::new(LaunchAgent::new(command)),
        Platform::Linux => Arc::new(XdgAutostart::new(command)),
        Platform::Other(_) => Arc::new(NoopAutostart),
    }
}

/// Returns the status surface for `platform`, or a no-op.
///
/// Only Windows has a tray surface. A Windows `Platform` value on a
/// non-Windows build also yields the no-op.
pub fn select_status_surface(platform: &Platform) -> Box<dyn StatusSurfacePort> {
    match platform {
        #[cfg(windows)]
        Platform::Windows => Box::new(crate::surface::TraySurface::new()),
        _ => Box::new(NoopSurface),
    }
}
