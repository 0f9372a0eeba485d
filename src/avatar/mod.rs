//! The avatar the speech pipeline drives
//!
//! Two seams separate the pipeline from whatever actually draws the face
//! and makes noise:
//!
//! - [`SpeechSurface`] receives balloon text, mouth aperture and tones from
//!   the animator
//! - [`Gestures`] receives expression and motion names from the controller
//!
//! Names are free text. An implementation resolves them through
//! [`Expression`] and [`Motion`] and reports what happened as a
//! [`GestureOutcome`] rather than failing.

pub mod console;
pub mod expression;
pub mod motion;
pub mod recorder;

use thiserror::Error;

use crate::time::Millis;

pub use console::ConsoleAvatar;
pub use expression::Expression;
pub use motion::{ease_cubic_in_out, Axis, Keyframe, Motion, Pose};
pub use recorder::{Effect, RecordingAvatar};

/// Output side used by the speech animator
pub trait SpeechSurface {
    /// Show `text` in the speech balloon, replacing what was there
    fn render_partial_text(&mut self, text: &str);
    /// Open the mouth to `ratio` (0.0 closed, 1.0 wide open)
    fn set_mouth_aperture(&mut self, ratio: f32);
    fn emit_tone(&mut self, frequency_hz: u32, duration_ms: Millis);
    fn clear_text(&mut self);
}

/// What became of a gesture request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    Applied,
    /// The name did not match anything
    Unknown,
    /// Known, but not possible right now
    Skipped,
}

/// Expression and motion side of the avatar
pub trait Gestures {
    fn set_expression(&mut self, name: &str) -> GestureOutcome;
    fn perform_motion(&mut self, name: &str) -> GestureOutcome;

    /// True while a motion is still playing
    fn is_moving(&self) -> bool {
        false
    }
}

/// Everything the controller needs from an avatar
pub trait Avatar: SpeechSurface + Gestures {}

impl<T: SpeechSurface + Gestures> Avatar for T {}

/// A gesture name that resolves to nothing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnknownGesture {
    #[error("unknown expression: {0}")]
    Expression(String),
    #[error("unknown motion: {0}")]
    Motion(String),
}
