//! Speech animation for a small desktop avatar
//!
//! Bytes arrive from a controller link, get framed into records and
//! interpreted as commands, and spoken text is revealed a few characters
//! at a time while the mouth moves and a short tone plays per character.

pub mod avatar;
pub mod cli;
pub mod codepoint;
pub mod comm;
pub mod config;
pub mod controller;
pub mod logging;
pub mod playlist;
pub mod propfile;
pub mod sound;
pub mod speech;
pub mod time;

pub use cli::Cli;
pub use config::Options;
pub use controller::{Controller, Dispatch};
pub use logging::LogLevel;
