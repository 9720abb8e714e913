//! Error types for Simple Speak

use std::io;
use thiserror::Error;

/// Main error type for Simple Speak
#[derive(Error, Debug)]
pub enum SpeakError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for Simple Speak operations
pub type Result<T> = std::result::Result<T, SpeakError>;

impl From<serde_json::Error> for SpeakError {
    fn from(e: serde_json::Error) -> Self {
        SpeakError::Config(format!("JSON error: {}", e))
    }
}
