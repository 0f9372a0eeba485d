use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use avatar_speech::avatar::ConsoleAvatar;
use avatar_speech::config::{self, Options};
use avatar_speech::controller::{Controller, Dispatch};
use avatar_speech::logging;
use avatar_speech::time::MonotonicClock;
use avatar_speech::Cli;
use clap::Parser;
use crossbeam::channel::{self, Receiver, TryRecvError};

const READ_CHUNK: usize = 256;

/// Copy bytes from `source` into the channel until end of input
fn spawn_reader(input: Option<PathBuf>) -> Result<Receiver<Vec<u8>>> {
    let mut source: Box<dyn Read + Send> = match input {
        Some(ref path) => Box::new(
            File::open(path)
                .with_context(|| format!("Failed to open input {}", path.display()))?,
        ),
        None => Box::new(io::stdin()),
    };
    let (tx, rx) = channel::unbounded();
    thread::Builder::new()
        .name("input-reader".to_string())
        .spawn(move || {
            let mut buf = [0u8; READ_CHUNK];
            loop {
                match source.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        log::error!("input read failed: {}", e);
                        break;
                    }
                }
            }
            log::debug!("input closed");
        })
        .context("Failed to start input reader")?;
    Ok(rx)
}

fn build_avatar(options: &Options) -> ConsoleAvatar {
    let avatar = ConsoleAvatar::new();
    #[cfg(feature = "audio")]
    {
        match avatar_speech::sound::TonePlayer::spawn(options.beep_volume) {
            Ok(player) => return avatar.with_tone_output(Box::new(player)),
            Err(e) => log::warn!("audio disabled: {}", e),
        }
    }
    #[cfg(not(feature = "audio"))]
    log::debug!("built without audio, beep volume {} unused", options.beep_volume);
    avatar
}

fn run(cli: &Cli, options: &Options) -> Result<()> {
    let clock = MonotonicClock::new();
    let mut controller = Controller::new(build_avatar(options), options);

    if let Some(ref text) = cli.say {
        let phonetic = cli.phonetic.as_deref().unwrap_or("");
        if controller.speak(text, phonetic, clock.now_ms()) == Dispatch::NoText {
            log::warn!("nothing to say");
            return Ok(());
        }
        while controller.has_pending_work() {
            thread::sleep(Duration::from_millis(options.tick_ms));
            controller.tick(clock.now_ms());
        }
        return Ok(());
    }

    let input = spawn_reader(options.input.clone())?;
    let mut input_open = true;
    loop {
        let now = clock.now_ms();
        while input_open {
            match input.try_recv() {
                Ok(bytes) => {
                    controller.feed(&bytes, now);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => input_open = false,
            }
        }

        controller.tick(now);
        if cli.playlist && !controller.is_animating() {
            controller.speak_next_line(now);
        }

        if !input_open && !cli.playlist && !controller.has_pending_work() {
            break;
        }
        thread::sleep(Duration::from_millis(options.tick_ms));
    }

    let stats = controller.stats();
    log::info!(
        "{} bytes received, {} records, {} duplicates dropped, {} bytes discarded",
        stats.bytes_received,
        stats.records_extracted,
        stats.duplicates_dropped,
        stats.bytes_discarded
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let options = config::load_config(cli.config.as_deref())?;
    let options = cli.merge_into_options(options)?;

    logging::init(options.log_level, options.log_file.as_deref())?;
    log::info!("avatar-speech {} starting", env!("CARGO_PKG_VERSION"));
    log::debug!("options: {:?}", options);

    run(&cli, &options)
}
