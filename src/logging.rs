//! Process logger
//!
//! Everything in the crate logs through the `log` facade. The binary
//! installs [`StreamLogger`] once at startup; it writes `[LEVEL] message`
//! lines to stderr or appends them to a log file.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

/// Verbosity levels, numbered as on the command line
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Nothing = 0,
    User = 1,
    Error = 2,
    Warning = 3,
    #[default]
    Info = 4,
    Debug = 5,
    All = 6,
}

impl LogLevel {
    /// Create a LogLevel from an integer; out-of-range values mean Info
    pub fn from_i32(level: i32) -> Self {
        match level {
            0 => LogLevel::Nothing,
            1 => LogLevel::User,
            2 => LogLevel::Error,
            3 => LogLevel::Warning,
            4 => LogLevel::Info,
            5 => LogLevel::Debug,
            6 => LogLevel::All,
            _ => LogLevel::Info,
        }
    }

    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// The `log` crate filter this level lets through
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Nothing => LevelFilter::Off,
            LogLevel::User | LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::All => LevelFilter::Trace,
        }
    }
}

/// Writes formatted records to any byte sink
pub struct StreamLogger {
    level: LevelFilter,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl StreamLogger {
    pub fn new(level: LevelFilter, sink: Box<dyn Write + Send>) -> Self {
        Self {
            level,
            sink: Mutex::new(sink),
        }
    }

    pub fn stderr(level: LevelFilter) -> Self {
        Self::new(level, Box::new(io::stderr()))
    }

    /// Append to `path`, creating it if needed
    pub fn file(level: LevelFilter, path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        Ok(Self::new(level, Box::new(file)))
    }
}

impl Log for StreamLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut sink = self.sink.lock();
        // Nowhere left to report a failed log write
        let _ = writeln!(sink, "[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {
        let _ = self.sink.lock().flush();
    }
}

/// Install the process logger. Call once, before anything logs.
pub fn init(level: LogLevel, log_file: Option<&Path>) -> Result<()> {
    let filter = level.to_level_filter();
    let logger = match log_file {
        Some(path) => StreamLogger::file(filter, path)?,
        None => StreamLogger::stderr(filter),
    };
    log::set_logger(Box::leak(Box::new(logger)))
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;
    log::set_max_level(filter);
    Ok(())
}
