//! Simple Speak - interactive text-to-speech prompt
//!
//! Reads lines of text from the user, synthesizes them to audio through an
//! external speech engine, caches each clip as a WAV file, and plays it back.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod playback;
pub mod session;

pub use error::{Result, SpeakError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "simple-speak";
