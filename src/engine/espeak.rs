//! espeak-ng backend
//!
//! Spawns espeak-ng as a subprocess for each utterance and collects the
//! synthesized WAV through a temp file. Formant synthesis sounds robotic
//! but works on any machine with espeak-ng installed.
//!
//! Dependencies:
//! - espeak-ng (install with: sudo apt install espeak-ng)

use crate::engine::{AudioClip, SpeechEngine, VoiceSelection};
use crate::{Result, SpeakError};
use log::{debug, error};
use std::io::Write;
use std::process::{Command, Stdio};

/// Voice used when the configuration selects nothing
const DEFAULT_VOICE: &str = "en";

/// espeak-ng backend
pub struct EspeakEngine {
    /// Path to espeak-ng
    espeak_path: String,
}

impl EspeakEngine {
    /// Create a new espeak-ng engine
    ///
    /// Verifies espeak-ng is available
    pub fn new() -> Result<Self> {
        debug!("Creating espeak-ng backend");

        let espeak_path = Self::find_espeak()?;
        debug!("Found espeak-ng at: {}", espeak_path);

        Ok(Self { espeak_path })
    }

    /// Find the espeak-ng executable
    fn find_espeak() -> Result<String> {
        let paths = vec!["espeak-ng", "/usr/bin/espeak-ng", "espeak"];

        for path in paths {
            if let Ok(status) = Command::new(path)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                if status.success() {
                    return Ok(path.to_string());
                }
            }
        }

        Err(SpeakError::Synthesis(
            "espeak-ng not found. Install with: sudo apt install espeak-ng".to_string(),
        ))
    }

    /// Map a voice selection to an espeak-ng voice name
    ///
    /// Speaker ids are passed straight through as voice names ("en-us",
    /// "de", ...). Cloning needs reference-audio support espeak-ng does
    /// not have, so it is rejected here rather than silently ignored.
    fn voice_name<'a>(voice: &'a VoiceSelection) -> Result<&'a str> {
        match voice {
            VoiceSelection::Default => Ok(DEFAULT_VOICE),
            VoiceSelection::Builtin(id) => Ok(id.as_str()),
            VoiceSelection::Cloned(path) => Err(SpeakError::Synthesis(format!(
                "espeak-ng cannot clone a voice from {}; remove voice_file from the \
                 config or switch to an engine with reference-audio support",
                path.display()
            ))),
        }
    }
}

impl SpeechEngine for EspeakEngine {
    fn name(&self) -> &'static str {
        "espeak-ng"
    }

    fn synthesize(&mut self, text: &str, voice: &VoiceSelection) -> Result<AudioClip> {
        let voice_name = Self::voice_name(voice)?;

        // espeak-ng cannot stream a well-formed WAV to a pipe (the header
        // needs a seek to patch up), so synthesize into a temp file
        let wav_file = tempfile::Builder::new()
            .prefix("simple-speak-")
            .suffix(".wav")
            .tempfile()
            .map_err(|e| SpeakError::Synthesis(format!("failed to create temp file: {}", e)))?;

        debug!("Running espeak-ng (voice: {})", voice_name);

        // Text goes through stdin so utterance length is never limited by argv
        let mut child = Command::new(&self.espeak_path)
            .arg("--stdin")
            .arg("-v")
            .arg(voice_name)
            .arg("-w")
            .arg(wav_file.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                error!("Failed to spawn espeak-ng: {}", e);
                SpeakError::Synthesis(format!("failed to start espeak-ng: {}", e))
            })?;

        {
            let mut stdin = child.stdin.take().ok_or_else(|| {
                SpeakError::Synthesis("failed to open espeak-ng stdin".to_string())
            })?;
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| SpeakError::Synthesis(format!("failed to send text: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| SpeakError::Synthesis(format!("failed to wait for espeak-ng: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeakError::Synthesis(format!(
                "espeak-ng exited with {} (voice '{}'): {}",
                output.status,
                voice_name,
                stderr.trim()
            )));
        }

        let clip = AudioClip::from_wav_file(wav_file.path())?;
        debug!(
            "espeak-ng produced {:.2}s of audio at {} Hz",
            clip.duration_seconds(),
            clip.sample_rate
        );
        Ok(clip)
    }
}
