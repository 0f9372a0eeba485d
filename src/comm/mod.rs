//! Command link
//!
//! Bytes from a remote controller become [`Command`]s in two stages:
//!
//! - [`Framer`] reassembles UTF-8 characters, buffers them, and cuts out
//!   brace-balanced [`Record`]s, suppressing duplicates
//! - [`interpret`] reads the fixed key set of one record
//!
//! Both stages are infallible. Malformed input degrades to a named outcome
//! (a dropped sequence, a raw-text record) plus a log line.

pub mod assembly;
pub mod dedup;
pub mod escape;
pub mod framer;
pub mod parser;
pub mod types;

pub use assembly::{Utf8Assembly, Utf8Step};
pub use dedup::{Admission, DedupWindow};
pub use framer::{FrameStats, Framer, FramerLimits};
pub use parser::{interpret, interpret_text, ParseError};
pub use types::{Command, Record, RecordShape, SpeechCommand};
