//! Segmented speech animation
//!
//! An utterance is a display text and a phonetic text. Both are split into
//! line segments; each segment is revealed one character per interval
//! while the mouth follows the phonetic characters, with a pause between
//! segments.

pub mod animator;
pub mod mouth;
pub mod segment;
pub mod types;

pub use animator::SpeechAnimator;
pub use mouth::{aperture_for, CLOSED, DEFAULT_APERTURE};
pub use segment::{pair_segments, split_segments, SegmentPair};
pub use types::{Phase, Progress, Timing};
