//! piper backend
//!
//! Spawns the piper neural TTS binary as a subprocess. piper reads text
//! on stdin and, with `--output-raw`, writes raw 16-bit mono PCM to
//! stdout at the model's native sample rate.
//!
//! Enabled by pointing the `PIPER_MODEL` environment variable at a voice
//! model (`.onnx`); the model's `.json` sidecar supplies the sample rate.
//!
//! Dependencies:
//! - piper (https://github.com/rhasspy/piper)
//! - a downloaded voice model

use crate::engine::{AudioClip, SpeechEngine, VoiceSelection};
use crate::{Result, SpeakError};
use log::{debug, error, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Sample rate assumed when the model sidecar is missing or unreadable
const FALLBACK_SAMPLE_RATE: u32 = 22_050;

/// piper backend
pub struct PiperEngine {
    /// Path to the piper executable
    piper_path: String,

    /// Voice model (.onnx) passed to every invocation
    model: PathBuf,

    /// Output sample rate, read from the model's sidecar
    sample_rate: u32,
}

impl PiperEngine {
    /// Model path from the `PIPER_MODEL` environment variable, if set
    pub fn configured_model() -> Option<PathBuf> {
        std::env::var_os("PIPER_MODEL").map(PathBuf::from)
    }

    /// Create a new piper engine for the given voice model
    ///
    /// Verifies the piper executable and the model file are available
    pub fn new(model: PathBuf) -> Result<Self> {
        debug!("Creating piper backend");

        if !model.exists() {
            return Err(SpeakError::Synthesis(format!(
                "piper model not found: {}",
                model.display()
            )));
        }

        let piper_path = Self::find_piper()?;
        debug!("Found piper at: {}", piper_path);

        let sample_rate = Self::model_sample_rate(&model).unwrap_or_else(|| {
            warn!(
                "Could not read sample rate from model sidecar, assuming {} Hz",
                FALLBACK_SAMPLE_RATE
            );
            FALLBACK_SAMPLE_RATE
        });
        debug!("piper model sample rate: {} Hz", sample_rate);

        Ok(Self {
            piper_path,
            model,
            sample_rate,
        })
    }

    /// Find the piper executable
    fn find_piper() -> Result<String> {
        let paths = vec!["piper", "/usr/bin/piper", "/usr/local/bin/piper"];

        for path in paths {
            if let Ok(status) = Command::new(path)
                .arg("--help")
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
            "piper not found on PATH (https://github.com/rhasspy/piper)".to_string(),
        ))
    }

    /// Read the output sample rate from the model's `.json` sidecar
    ///
    /// piper ships every voice as `name.onnx` + `name.onnx.json`.
    fn model_sample_rate(model: &Path) -> Option<u32> {
        let mut sidecar = model.as_os_str().to_os_string();
        sidecar.push(".json");

        let contents = std::fs::read_to_string(&sidecar).ok()?;
        Self::parse_sample_rate(&contents)
    }

    /// Extract `audio.sample_rate` from sidecar JSON
    fn parse_sample_rate(contents: &str) -> Option<u32> {
        let value: serde_json::Value = serde_json::from_str(contents).ok()?;
        value
            .get("audio")?
            .get("sample_rate")?
            .as_u64()
            .map(|rate| rate as u32)
    }

    /// Map a voice selection to piper's `--speaker` argument
    ///
    /// Multi-speaker piper models index their voices numerically.
    fn speaker_arg(voice: &VoiceSelection) -> Result<Option<String>> {
        match voice {
            VoiceSelection::Default => Ok(None),
            VoiceSelection::Builtin(id) => {
                id.parse::<u32>().map(|n| Some(n.to_string())).map_err(|_| {
                    SpeakError::Synthesis(format!(
                        "piper speaker ids are numeric, got '{}'",
                        id
                    ))
                })
            }
            VoiceSelection::Cloned(path) => Err(SpeakError::Synthesis(format!(
                "piper cannot clone a voice from {}; remove voice_file from the \
                 config or switch to an engine with reference-audio support",
                path.display()
            ))),
        }
    }

    /// Convert piper's raw little-endian 16-bit output to samples
    fn decode_raw(bytes: &[u8]) -> Vec<i16> {
        bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    }
}

impl SpeechEngine for PiperEngine {
    fn name(&self) -> &'static str {
        "piper"
    }

    fn synthesize(&mut self, text: &str, voice: &VoiceSelection) -> Result<AudioClip> {
        let speaker = Self::speaker_arg(voice)?;

        let mut cmd = Command::new(&self.piper_path);
        cmd.arg("--model").arg(&self.model).arg("--output-raw");
        if let Some(speaker) = &speaker {
            cmd.arg("--speaker").arg(speaker);
        }

        debug!(
            "Running piper (model: {}, speaker: {:?})",
            self.model.display(),
            speaker
        );

        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                error!("Failed to spawn piper: {}", e);
                SpeakError::Synthesis(format!("failed to start piper: {}", e))
            })?;

        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| SpeakError::Synthesis("failed to open piper stdin".to_string()))?;
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| SpeakError::Synthesis(format!("failed to send text: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| SpeakError::Synthesis(format!("failed to wait for piper: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeakError::Synthesis(format!(
                "piper exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let samples = Self::decode_raw(&output.stdout);
        if samples.is_empty() {
            warn!("piper produced no audio for this utterance");
        }

        let clip = AudioClip {
            sample_rate: self.sample_rate,
            channels: 1,
            samples,
        };
        debug!(
            "piper produced {:.2}s of audio at {} Hz",
            clip.duration_seconds(),
            clip.sample_rate
        );
        Ok(clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample_rate() {
        let sidecar = r#"{"audio": {"sample_rate": 22050, "quality": "medium"}}"#;
        assert_eq!(PiperEngine::parse_sample_rate(sidecar), Some(22050));

        assert_eq!(PiperEngine::parse_sample_rate("{}"), None);
        assert_eq!(PiperEngine::parse_sample_rate("not json"), None);
    }

    #[test]
    fn test_speaker_arg_mapping() {
        assert_eq!(PiperEngine::speaker_arg(&VoiceSelection::Default).unwrap(), None);
        assert_eq!(
            PiperEngine::speaker_arg(&VoiceSelection::Builtin("3".to_string())).unwrap(),
            Some("3".to_string())
        );

        // Non-numeric ids are a configuration mistake, not a silent default
        let err =
            PiperEngine::speaker_arg(&VoiceSelection::Builtin("alice".to_string())).unwrap_err();
        assert!(err.to_string().contains("numeric"));
    }

    #[test]
    fn test_cloning_is_rejected() {
        let voice = VoiceSelection::Cloned(PathBuf::from("sample.wav"));
        let err = PiperEngine::speaker_arg(&voice).unwrap_err();
        assert!(err.to_string().contains("clone"));
    }

    #[test]
    fn test_decode_raw_little_endian() {
        let bytes = [0x00, 0x00, 0xFF, 0x7F, 0x00, 0x80, 0x01];
        // Trailing odd byte is dropped
        assert_eq!(PiperEngine::decode_raw(&bytes), vec![0, 32767, -32768]);
    }

    #[test]
    fn test_missing_model_is_an_error() {
        let err = PiperEngine::new(PathBuf::from("/nonexistent/voice.onnx")).unwrap_err();
        assert!(err.to_string().contains("model not found"));
    }
}
