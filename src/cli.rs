use std::path::PathBuf;

use crate::config::{parse_volume, Options};
use crate::logging::LogLevel;
use anyhow::{bail, Context, Result};
use clap::Parser;

/// Speech animation for a small desktop avatar
#[derive(Parser, Debug, Default)]
#[command(name = "avatar-speech")]
#[command(version)]
#[command(about = "Animates avatar speech from a byte stream of commands", long_about = None)]
pub struct Cli {
    /// Read commands from this file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Configuration file (key = value lines)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Milliseconds between revealed characters
    #[arg(long = "char-interval", value_name = "MS")]
    pub char_interval: Option<String>,

    /// Base beep frequency in Hz
    #[arg(long, value_name = "HZ")]
    pub beep: Option<String>,

    /// Beep volume (0-100)
    #[arg(long, value_name = "VOLUME")]
    pub volume: Option<String>,

    /// Main loop period in milliseconds
    #[arg(long, value_name = "MS")]
    pub tick: Option<String>,

    /// Log file path
    #[arg(short, long, value_name = "FILE")]
    pub logfile: Option<PathBuf>,

    /// Start with debug tracing on
    #[arg(short, long)]
    pub debug: bool,

    /// Start with debug tracing off
    #[arg(short, long, conflicts_with = "debug")]
    pub quiet: bool,

    /// Log verbosity (0 = nothing .. 6 = everything)
    #[arg(short, long, value_name = "LEVEL")]
    pub verbosity: Option<i32>,

    /// Speak this text once, then exit
    #[arg(short, long, value_name = "TEXT", conflicts_with = "playlist")]
    pub say: Option<String>,

    /// Pronunciation for --say
    #[arg(short, long, value_name = "TEXT", requires = "say")]
    pub phonetic: Option<String>,

    /// Speak the built-in lines whenever the avatar is idle
    #[arg(long)]
    pub playlist: bool,
}

impl Cli {
    /// Merge CLI arguments into the options struct
    pub fn merge_into_options(&self, mut opts: Options) -> Result<Options> {
        if let Some(ref input) = self.input {
            opts.input = Some(input.clone());
        }

        if let Some(ref interval) = self.char_interval {
            opts.char_interval_ms =
                Self::parse_millis(interval).context("Invalid character interval")?;
        }

        if let Some(ref beep) = self.beep {
            opts.beep_frequency = Self::parse_frequency(beep).context("Invalid beep frequency")?;
        }

        if let Some(ref volume) = self.volume {
            opts.beep_volume = parse_volume(volume).context("Invalid beep volume")?;
        }

        if let Some(ref tick) = self.tick {
            opts.tick_ms = Self::parse_millis(tick).context("Invalid tick period")?;
        }

        if let Some(ref logfile) = self.logfile {
            opts.log_file = Some(logfile.clone());
        }

        if self.debug {
            opts.debug = true;
        } else if self.quiet {
            opts.debug = false;
        }

        if let Some(level) = self.verbosity {
            if !(0..=6).contains(&level) {
                bail!("Verbosity {} out of range (0-6)", level);
            }
            opts.log_level = LogLevel::from_i32(level);
        }

        opts.validate().context("Invalid options")?;
        Ok(opts)
    }

    /// Parse a positive millisecond count
    pub fn parse_millis(s: &str) -> Result<u64> {
        let ms: u64 = s
            .trim()
            .parse()
            .with_context(|| format!("Not a number: {}", s))?;
        if ms == 0 {
            bail!("Must be greater than zero");
        }
        Ok(ms)
    }

    /// Parse an audible frequency in Hz
    pub fn parse_frequency(s: &str) -> Result<u32> {
        let hz: u32 = s
            .trim()
            .parse()
            .with_context(|| format!("Not a number: {}", s))?;
        if !(20..=20_000).contains(&hz) {
            bail!("Frequency {} Hz out of range (20-20000)", hz);
        }
        Ok(hz)
    }
}
