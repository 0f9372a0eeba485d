//! Timing and progress types for the speech animator

use crate::time::Millis;

/// Fixed delays and limits the animator runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Delay between two reveals
    pub char_interval_ms: Millis,
    /// Pause between two segments
    pub segment_pause_ms: Millis,
    /// Mouth closes this long after the last reveal
    pub mouth_close_delay_ms: Millis,
    /// Balloon clears this long after the last reveal
    pub clear_delay_ms: Millis,
    /// Length of each tone pulse
    pub beep_duration_ms: Millis,
    /// Tone frequency until something retunes it
    pub beep_frequency: u32,
    /// Width of the sliding balloon window, in characters
    pub max_display_chars: usize,
    /// Segments kept per utterance
    pub max_segments: usize,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            char_interval_ms: 100,
            segment_pause_ms: 500,
            mouth_close_delay_ms: 100,
            clear_delay_ms: 2000,
            beep_duration_ms: 50,
            beep_frequency: 1000,
            max_display_chars: 9,
            max_segments: 20,
        }
    }
}

/// Where the animator is in an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Revealing,
    SegmentPause,
}

/// Snapshot of animator state for diagnostics and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub phase: Phase,
    pub segment_index: usize,
    pub segment_count: usize,
    /// Character cursor within the current segment (never a byte offset)
    pub char_index: usize,
    pub mouth_close_pending: bool,
    pub clear_pending: bool,
}
