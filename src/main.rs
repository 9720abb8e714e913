//! Simple Speak main entry point
//!
//! Startup order matters: the cache directory and the speech engine are
//! required, so failures there are fatal; a broken config only warns and
//! falls back to defaults.

use log::{error, info};
use simple_speak::cache::{ClipCache, CACHE_DIR};
use simple_speak::config::Config;
use simple_speak::engine::{create_engine, VoiceSelection};
use simple_speak::playback::RodioPlayer;
use simple_speak::session::Session;
use std::io;
use std::process;

fn main() {
    // Verbosity comes from RUST_LOG; there are no command-line flags
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    if let Err(e) = run() {
        error!("Fatal error: {}", e);
        process::exit(1);
    }
}

fn run() -> simple_speak::Result<()> {
    info!("Simple Speak {} starting", simple_speak::VERSION);

    let config = Config::load();
    let voice = VoiceSelection::from_config(&config);
    info!("Voice selection: {:?}", voice);

    let cache = ClipCache::new(CACHE_DIR);
    cache.ensure()?;

    println!("Initializing speech engine (this might take a while)...");
    let engine = create_engine()?;

    println!("\nSimple Speak (engine: {})", engine.name());
    println!("Type 'quit' or 'exit' to stop.");

    let mut session = Session::new(engine, Box::new(RodioPlayer::new()), voice, cache);

    let stdin = io::stdin();
    session.run(&mut stdin.lock(), &mut io::stdout())
}
