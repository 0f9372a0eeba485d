//! Tone output
//!
//! The animator only asks for "a tone of N Hz for M ms". Anything that can
//! make that sound implements [`ToneOutput`]. With the `audio` feature,
//! [`tone::TonePlayer`] plays it through the default output device.

use thiserror::Error;

use crate::time::Millis;

#[cfg(feature = "audio")]
pub mod tone;

#[cfg(feature = "audio")]
pub use tone::TonePlayer;

/// Errors opening or driving an audio device
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    NoDevice(String),
    #[error("audio thread is gone")]
    ThreadGone,
    #[error("failed to spawn audio thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Something that can sound a short beep
pub trait ToneOutput: Send {
    fn play(&mut self, frequency_hz: u32, duration_ms: Millis);
}

/// Map a 0-100 volume onto the 0.0-1.0 gain range
pub fn volume_to_gain(volume: u8) -> f32 {
    f32::from(volume.min(100)) / 100.0
}
