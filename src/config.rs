//! Configuration management

use crate::{Result, SpeakError};
use log::{debug, info, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "config.json";

/// Application configuration
///
/// Loaded once at startup and passed explicitly into the session loop.
/// Selects which voice the speech engine uses for every utterance.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identifier of a built-in voice (engine-specific), e.g. an espeak-ng
    /// voice name or a piper speaker number
    pub speaker_id: Option<String>,

    /// Path to a reference audio sample for voice cloning.
    /// Takes precedence over `speaker_id` when set.
    pub voice_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `config.json` in the working directory.
    ///
    /// Never fails: a missing file yields the defaults, a malformed file
    /// yields the defaults with a warning.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load configuration from an explicit path, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        debug!("Loading config from {:?}", path);

        if !path.exists() {
            info!("{} not found, using default configuration", path.display());
            return Self::default();
        }

        match Self::read_from(path) {
            Ok(config) => config.validated(),
            Err(e) => {
                warn!(
                    "Failed to load {}: {}. Using default configuration.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Parse the config file, surfacing read and decode errors
    fn read_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| SpeakError::Config(format!("failed to read config: {}", e)))?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Drop settings that cannot be honored
    ///
    /// A `voice_file` pointing at a nonexistent path is ignored rather than
    /// failing every synthesis later.
    fn validated(mut self) -> Self {
        if let Some(voice_file) = &self.voice_file {
            if !voice_file.exists() {
                warn!(
                    "Voice file specified in config not found: {}. It will be ignored.",
                    voice_file.display()
                );
                self.voice_file = None;
            }
        }
        self
    }
}
