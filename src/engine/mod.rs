//! Speech synthesis engines
//!
//! Provides a unified interface over external text-to-speech programs.
//! The session loop hands an engine one line of text plus a voice
//! selection and gets back an in-memory audio clip.

pub mod espeak;
pub mod piper;

use crate::config::Config;
use crate::{Result, SpeakError};
use log::info;
use std::path::{Path, PathBuf};

/// Which voice the engine should speak with
///
/// Derived once from the configuration and reused for every utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceSelection {
    /// The engine's own default voice
    Default,
    /// A built-in voice profile selected by identifier
    Builtin(String),
    /// A voice cloned from a user-supplied reference audio sample
    Cloned(PathBuf),
}

impl VoiceSelection {
    /// Derive the voice selection from loaded configuration.
    ///
    /// A cloning sample takes precedence over a built-in speaker id.
    pub fn from_config(config: &Config) -> Self {
        if let Some(path) = &config.voice_file {
            return VoiceSelection::Cloned(path.clone());
        }
        if let Some(id) = &config.speaker_id {
            return VoiceSelection::Builtin(id.clone());
        }
        VoiceSelection::Default
    }
}

/// One synthesized utterance held in memory
///
/// Interleaved 16-bit PCM samples. Produced by an engine, then written to
/// the cache by the session loop; never reused across requests.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioClip {
    /// Length of the clip in seconds
    pub fn duration_seconds(&self) -> f32 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / (self.sample_rate as f32 * self.channels as f32)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Write the clip to disk as a 16-bit PCM WAV file
    pub fn save_wav(&self, path: &Path) -> Result<()> {
        self.write_wav(path).map_err(|e| {
            SpeakError::Cache(format!("failed to write {}: {}", path.display(), e))
        })
    }

    fn write_wav(&self, path: &Path) -> std::result::Result<(), hound::Error> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()
    }

    /// Read a 16-bit PCM WAV file back into memory
    ///
    /// Used by backends that can only hand their output over as a file.
    pub fn from_wav_file(path: &Path) -> Result<Self> {
        Self::read_wav(path).map_err(|e| {
            SpeakError::Synthesis(format!("failed to read WAV {}: {}", path.display(), e))
        })
    }

    fn read_wav(path: &Path) -> std::result::Result<Self, hound::Error> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let samples = reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }
}

/// Speech synthesis engine trait
///
/// All backends implement this to turn text into a waveform. Model
/// loading, phonemization and vocoding all live behind this seam.
pub trait SpeechEngine {
    /// Backend name for logs and the startup banner
    fn name(&self) -> &'static str;

    /// Produce a waveform for the given text and voice selection
    fn synthesize(&mut self, text: &str, voice: &VoiceSelection) -> Result<AudioClip>;
}

/// Create the best available speech engine
///
/// Probes backends in preference order:
/// 1. piper (neural TTS), when a model is configured via `PIPER_MODEL`
/// 2. espeak-ng (formant synthesis, available almost everywhere)
///
/// Both backends provide helpful error messages when unavailable.
pub fn create_engine() -> Result<Box<dyn SpeechEngine>> {
    if let Some(model) = piper::PiperEngine::configured_model() {
        info!("Trying piper backend (model: {})...", model.display());

        match piper::PiperEngine::new(model) {
            Ok(engine) => {
                info!("✓ Successfully initialized piper backend");
                return Ok(Box::new(engine));
            }
            Err(e) => {
                info!("✗ piper backend unavailable: {}", e);
            }
        }
    }

    info!("Trying espeak-ng backend...");
    match espeak::EspeakEngine::new() {
        Ok(engine) => {
            info!("✓ Successfully initialized espeak-ng backend");
            Ok(Box::new(engine))
        }
        Err(e) => Err(SpeakError::Synthesis(format!(
            "No speech engine available. Tried:\n\
             1. piper (set PIPER_MODEL to a piper voice model to enable)\n\
             2. espeak-ng (install: sudo apt install espeak-ng)\n\
             Error: {}",
            e
        ))),
    }
}
