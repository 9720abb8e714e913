//! Cache directory for synthesized clips

use crate::{Result, SpeakError};
use chrono::Local;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed cache directory, relative to the working directory
pub const CACHE_DIR: &str = "cache";

/// On-disk store for synthesized WAV files
///
/// One file per utterance, named by local timestamp. Files persist after
/// the process exits; nothing is ever evicted.
pub struct ClipCache {
    root: PathBuf,
}

impl ClipCache {
    /// Create a cache rooted at the given directory (not yet created on disk)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache directory path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the cache directory if it does not exist yet
    pub fn ensure(&self) -> Result<()> {
        if self.root.exists() {
            return Ok(());
        }

        fs::create_dir_all(&self.root).map_err(|e| {
            SpeakError::Cache(format!(
                "failed to create cache directory {}: {}",
                self.root.display(),
                e
            ))
        })?;
        info!("Created cache directory: {}", self.root.display());
        Ok(())
    }

    /// Pick a fresh path for the next clip
    ///
    /// Names are local timestamps (`2026-08-05_14-03-59.wav`); a numeric
    /// suffix disambiguates utterances synthesized within the same second.
    pub fn next_clip_path(&self) -> PathBuf {
        let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");

        let mut path = self.root.join(format!("{}.wav", stamp));
        let mut counter = 1;
        while path.exists() {
            path = self.root.join(format!("{}_{}.wav", stamp, counter));
            counter += 1;
        }

        debug!("Next clip path: {}", path.display());
        path
    }
}
