//! In-process playback using rodio.
//!
//! Used on Windows, where no command-line player ships with the OS. The
//! output stream is opened per call and dropped once the sink drains, so the
//! player itself holds no audio handles and is `Send + Sync`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, Sink};
use tracing::debug;

use super::error::PlaybackError;
use super::{ensure_playable, PlaybackPort};

const ENGINE_NAME: &str = "rodio";

/// A player that decodes the file and renders it on the default output device.
#[derive(Debug, Default, Clone, Copy)]
pub struct RodioPlayer;

impl RodioPlayer {
    /// Creates a new player. No audio device is opened until `play`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PlaybackPort for RodioPlayer {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    fn play(&self, path: &Path) -> Result<(), PlaybackError> {
        let absolute = ensure_playable(path)?;

        let file = File::open(&absolute).map_err(|_| PlaybackError::FileNotFound(absolute.clone()))?;
        let decoder =
            Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::Decode(e.to_string()))?;

        let (_stream, handle) =
            OutputStream::try_default().map_err(|e| PlaybackError::EngineUnavailable {
                engine: ENGINE_NAME.to_string(),
                reason: e.to_string(),
            })?;
        let sink = Sink::try_new(&handle).map_err(|e| PlaybackError::EngineFailed {
            engine: ENGINE_NAME.to_string(),
            detail: e.to_string(),
        })?;

        sink.append(decoder);
        debug!(path = %absolute.display(), "Waiting for sink to drain");
        sink.sleep_until_end();

        Ok(())
    }
}
