//! Session loop tests
//!
//! Drive the prompt loop with scripted input and recording fakes for the
//! speech engine and the player, then check what reached each
//! collaborator and what landed in the cache directory.

use simple_speak::cache::ClipCache;
use simple_speak::engine::{AudioClip, SpeechEngine, VoiceSelection};
use simple_speak::playback::Playback;
use simple_speak::session::Session;
use simple_speak::{Result, SpeakError};
use std::cell::RefCell;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Engine fake that records every request
struct RecordingEngine {
    calls: Rc<RefCell<Vec<(String, VoiceSelection)>>>,
    fail: bool,
}

impl SpeechEngine for RecordingEngine {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn synthesize(&mut self, text: &str, voice: &VoiceSelection) -> Result<AudioClip> {
        self.calls
            .borrow_mut()
            .push((text.to_string(), voice.clone()));

        if self.fail {
            return Err(SpeakError::Synthesis("engine offline".to_string()));
        }

        // 20ms of silence
        Ok(AudioClip {
            sample_rate: 8000,
            channels: 1,
            samples: vec![0; 160],
        })
    }
}

/// Player fake that records every path it is asked to play
struct RecordingPlayer {
    played: Rc<RefCell<Vec<PathBuf>>>,
    fail: bool,
}

impl Playback for RecordingPlayer {
    fn play(&mut self, path: &Path) -> Result<()> {
        self.played.borrow_mut().push(path.to_path_buf());

        if self.fail {
            return Err(SpeakError::Playback("no output device".to_string()));
        }
        Ok(())
    }
}

/// Everything observable about one scripted session
struct SessionRun {
    calls: Vec<(String, VoiceSelection)>,
    played: Vec<PathBuf>,
    cache_files: Vec<PathBuf>,
    transcript: String,
    _dir: tempfile::TempDir,
}

impl SessionRun {
    fn prompts(&self) -> usize {
        self.transcript.matches("Enter text to synthesize:").count()
    }
}

fn run_session(
    input: &str,
    voice: VoiceSelection,
    engine_fails: bool,
    player_fails: bool,
) -> SessionRun {
    let dir = tempfile::tempdir().unwrap();
    let cache = ClipCache::new(dir.path().join("cache"));
    cache.ensure().expect("Failed to create cache directory");
    let cache_root = cache.root().to_path_buf();

    let calls = Rc::new(RefCell::new(Vec::new()));
    let played = Rc::new(RefCell::new(Vec::new()));

    let engine = RecordingEngine {
        calls: Rc::clone(&calls),
        fail: engine_fails,
    };
    let player = RecordingPlayer {
        played: Rc::clone(&played),
        fail: player_fails,
    };

    let mut session = Session::new(Box::new(engine), Box::new(player), voice, cache);

    let mut output = Vec::new();
    session
        .run(&mut Cursor::new(input.as_bytes()), &mut output)
        .expect("Session loop returned an error");

    let mut cache_files: Vec<PathBuf> = std::fs::read_dir(&cache_root)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    cache_files.sort();

    SessionRun {
        calls: calls.borrow().clone(),
        played: played.borrow().clone(),
        cache_files,
        transcript: String::from_utf8(output).unwrap(),
        _dir: dir,
    }
}

#[test]
fn test_one_cache_file_per_utterance() {
    let run = run_session("hello\nworld\nquit\n", VoiceSelection::Default, false, false);

    assert_eq!(run.calls.len(), 2);
    assert_eq!(run.calls[0].0, "hello");
    assert_eq!(run.calls[1].0, "world");

    // Exactly one cache file per successful synthesis, each played once
    assert_eq!(run.cache_files.len(), 2);
    assert_eq!(run.played, run.cache_files);
}

#[test]
fn test_exit_keywords_any_case() {
    for keyword in ["quit", "QUIT", "Exit", "eXiT", "  quit  "] {
        let input = format!("{}\n", keyword);
        let run = run_session(&input, VoiceSelection::Default, false, false);

        assert_eq!(run.calls.len(), 0, "'{}' should not be synthesized", keyword);
        assert_eq!(run.prompts(), 1, "'{}' should stop after one prompt", keyword);
    }
}

#[test]
fn test_end_of_input_exits_cleanly() {
    // No exit keyword at all; stdin just closes
    let run = run_session("hello\n", VoiceSelection::Default, false, false);

    assert_eq!(run.calls.len(), 1);
    assert_eq!(run.prompts(), 2);
}

#[test]
fn test_empty_input_reprompts_without_synthesis() {
    let run = run_session("\n   \nquit\n", VoiceSelection::Default, false, false);

    assert_eq!(run.calls.len(), 0);
    assert_eq!(run.cache_files.len(), 0);
    assert_eq!(run.transcript.matches("Please enter some text.").count(), 2);
    assert_eq!(run.prompts(), 3);
}

#[test]
fn test_speaker_id_reaches_engine_every_time() {
    let voice = VoiceSelection::Builtin("en-us".to_string());
    let run = run_session("one\ntwo\nquit\n", voice.clone(), false, false);

    assert_eq!(run.calls.len(), 2);
    for (_, seen) in &run.calls {
        assert_eq!(seen, &voice);
    }
}

#[test]
fn test_cloned_voice_reaches_engine() {
    let voice = VoiceSelection::Cloned(PathBuf::from("sample.wav"));
    let run = run_session("hello\nquit\n", voice.clone(), false, false);

    assert_eq!(run.calls.len(), 1);
    assert_eq!(run.calls[0].1, voice);
}

#[test]
fn test_synthesis_failure_leaves_no_cache_file() {
    let run = run_session("hello\nagain\nquit\n", VoiceSelection::Default, true, false);

    // Both lines were attempted, so the loop kept going after the failure
    assert_eq!(run.calls.len(), 2);
    assert_eq!(run.cache_files.len(), 0);
    assert_eq!(run.played.len(), 0);
    assert_eq!(
        run.transcript
            .matches("Sorry, failed to generate audio")
            .count(),
        2
    );
}

#[test]
fn test_playback_failure_keeps_cache_file() {
    let run = run_session("hello\nquit\n", VoiceSelection::Default, false, true);

    assert_eq!(run.cache_files.len(), 1);
    assert!(run.cache_files[0].exists(), "clip should remain on disk");
    assert!(run.transcript.contains("could not play audio file"));

    // And the loop went on to the next prompt
    assert_eq!(run.prompts(), 2);
}

#[test]
fn test_cached_clips_are_valid_wav() {
    let run = run_session("hello\nquit\n", VoiceSelection::Default, false, false);

    assert_eq!(run.cache_files.len(), 1);
    let clip = AudioClip::from_wav_file(&run.cache_files[0]).expect("cached clip unreadable");
    assert_eq!(clip.sample_rate, 8000);
    assert_eq!(clip.samples.len(), 160);
}
