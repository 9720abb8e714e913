//! Interactive session loop
//!
//! Prompts for text, hands it to the speech engine with the configured
//! voice, writes the resulting clip into the cache, and plays it back.
//! One utterance is fully synthesized, saved and played before the next
//! prompt appears.

use crate::cache::ClipCache;
use crate::engine::{SpeechEngine, VoiceSelection};
use crate::playback::Playback;
use crate::Result;
use log::{error, info};
use std::io::{BufRead, Write};

/// One interactive text-to-speech session
///
/// Collaborators are injected so tests can substitute recording fakes
/// for the engine and the player.
pub struct Session {
    engine: Box<dyn SpeechEngine>,
    player: Box<dyn Playback>,
    voice: VoiceSelection,
    cache: ClipCache,
}

impl Session {
    pub fn new(
        engine: Box<dyn SpeechEngine>,
        player: Box<dyn Playback>,
        voice: VoiceSelection,
        cache: ClipCache,
    ) -> Self {
        Self {
            engine,
            player,
            voice,
            cache,
        }
    }

    /// Run the prompt loop until an exit keyword or end of input.
    ///
    /// Synthesis, cache and playback failures are reported to the user
    /// and the loop continues; only losing the terminal itself ends the
    /// session with an error.
    pub fn run(&mut self, input: &mut impl BufRead, output: &mut impl Write) -> Result<()> {
        loop {
            write!(output, "\nEnter text to synthesize: ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                // stdin closed; treat like a typed exit
                writeln!(output)?;
                info!("End of input, exiting");
                break;
            }

            let text = line.trim();
            if is_exit_keyword(text) {
                info!("Exit keyword entered");
                break;
            }
            if text.is_empty() {
                writeln!(output, "Please enter some text.")?;
                continue;
            }

            self.speak_line(text, output)?;
        }

        Ok(())
    }

    /// Synthesize, cache and play a single utterance
    fn speak_line(&mut self, text: &str, output: &mut impl Write) -> Result<()> {
        info!("Synthesizing text: '{}'", text);

        let clip = match self.engine.synthesize(text, &self.voice) {
            Ok(clip) => clip,
            Err(e) => {
                error!("Synthesis failed: {}", e);
                writeln!(output, "Sorry, failed to generate audio for the text.")?;
                return Ok(());
            }
        };

        let clip_path = self.cache.next_clip_path();
        if let Err(e) = clip.save_wav(&clip_path) {
            error!("Failed to save clip: {}", e);
            writeln!(output, "Error: could not save audio to the cache.")?;
            return Ok(());
        }
        info!("Speech generated and saved to: {}", clip_path.display());

        // The clip stays cached even when playback fails
        if let Err(e) = self.player.play(&clip_path) {
            error!("Error playing audio file {}: {}", clip_path.display(), e);
            writeln!(
                output,
                "Error: could not play audio file '{}'.",
                clip_path.display()
            )?;
        }

        Ok(())
    }
}

/// Case-insensitive check for the typed exit keywords
fn is_exit_keyword(text: &str) -> bool {
    text.eq_ignore_ascii_case("quit") || text.eq_ignore_ascii_case("exit")
}
