//! Audio playback for cached clips

use crate::{Result, SpeakError};
use log::{debug, info};
use rodio::{Decoder, OutputStream, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Playback collaborator trait
///
/// The session loop plays each cached clip through this seam; tests
/// substitute a recording implementation.
pub trait Playback {
    /// Play the audio file at the given path, blocking until output
    /// completes
    fn play(&mut self, path: &Path) -> Result<()>;
}

/// Playback through the default audio output device via rodio
///
/// The output stream is opened per call, so a device that disappears
/// mid-session only fails that one playback instead of the whole run.
#[derive(Debug, Default)]
pub struct RodioPlayer;

impl RodioPlayer {
    pub fn new() -> Self {
        Self
    }
}

impl Playback for RodioPlayer {
    fn play(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(SpeakError::Playback(format!(
                "audio file not found: {}",
                path.display()
            )));
        }

        info!("Playing audio file: {}", path.display());

        // _stream must stay alive for the duration of playback
        let (_stream, handle) = OutputStream::try_default()
            .map_err(|e| SpeakError::Playback(format!("no audio output device: {}", e)))?;
        let sink = Sink::try_new(&handle)
            .map_err(|e| SpeakError::Playback(format!("failed to open audio sink: {}", e)))?;

        let file = File::open(path)
            .map_err(|e| SpeakError::Playback(format!("failed to open {}: {}", path.display(), e)))?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| SpeakError::Playback(format!("failed to decode {}: {}", path.display(), e)))?;

        sink.append(source);
        sink.sleep_until_end();

        debug!("Playback finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_reported() {
        let mut player = RodioPlayer::new();
        let err = player.play(Path::new("/nonexistent/clip.wav")).unwrap_err();
        assert!(matches!(err, SpeakError::Playback(_)));
        assert!(err.to_string().contains("not found"));
    }
}
