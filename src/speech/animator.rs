//! Segmented speech animator
//!
//! A poll-driven state machine. [`SpeechAnimator::start`] loads an utterance
//! and reveals its first character; [`SpeechAnimator::advance`] is called on
//! every tick of the outer loop and does whatever the elapsed time allows.
//! Nothing here sleeps.
//!
//! ```text
//! Idle -> Revealing <-> SegmentPause -> Idle
//! ```
//!
//! On the way back to `Idle` two one-shot timers are armed: one closes the
//! mouth, the other clears the balloon. They run on their own schedule and
//! are checked on every `advance`, whatever the phase.

use std::borrow::Cow;

use crate::avatar::SpeechSurface;
use crate::codepoint::{char_at, span};
use crate::speech::mouth::{aperture_for, CLOSED};
use crate::speech::segment::{pair_segments, SegmentPair};
use crate::speech::types::{Phase, Progress, Timing};
use crate::time::{elapsed, Millis};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Revealing,
    SegmentPause { since: Millis },
}

/// A one-shot action due at a fixed time
#[derive(Debug, Clone, Copy, Default)]
struct Deferred {
    due: Option<Millis>,
}

impl Deferred {
    fn schedule(&mut self, at: Millis) {
        self.due = Some(at);
    }

    fn cancel(&mut self) {
        self.due = None;
    }

    fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// True exactly once, on the first call at or after the due time
    fn fire(&mut self, now: Millis) -> bool {
        match self.due {
            Some(at) if now >= at => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

/// Display character to show for a given cursor position
///
/// A longer display text is stretched over the phonetic cursor; a shorter
/// one stops at its last character.
fn display_index(cursor: usize, display_len: usize, phonetic_len: usize) -> usize {
    let last = display_len.saturating_sub(1);
    if phonetic_len > 0 && display_len >= phonetic_len {
        (cursor * display_len / phonetic_len).min(last)
    } else {
        cursor.min(last)
    }
}

fn lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Reveals an utterance one character at a time on a [`SpeechSurface`]
pub struct SpeechAnimator<S: SpeechSurface> {
    surface: S,
    timing: Timing,
    tone_frequency: u32,
    segments: Vec<SegmentPair>,
    segment_index: usize,
    char_index: usize,
    state: State,
    last_reveal_at: Millis,
    mouth_close: Deferred,
    auto_clear: Deferred,
}

impl<S: SpeechSurface> SpeechAnimator<S> {
    pub fn new(surface: S, timing: Timing) -> Self {
        Self {
            surface,
            tone_frequency: timing.beep_frequency,
            timing,
            segments: Vec::new(),
            segment_index: 0,
            char_index: 0,
            state: State::Idle,
            last_reveal_at: 0,
            mouth_close: Deferred::default(),
            auto_clear: Deferred::default(),
        }
    }

    /// Load an utterance and reveal its first character.
    ///
    /// Any utterance in progress is discarded and pending close/clear
    /// actions are cancelled. Returns false when the display text has no
    /// non-empty segment; the animator stays idle in that case.
    pub fn start(&mut self, display: &str, phonetic: &str, now: Millis) -> bool {
        self.mouth_close.cancel();
        self.auto_clear.cancel();
        self.segments = pair_segments(display, phonetic, self.timing.max_segments);
        self.segment_index = 0;
        self.char_index = 0;

        if self.segments.is_empty() {
            self.state = State::Idle;
            log::debug!("nothing to animate");
            return false;
        }

        log::debug!("animating {} segment(s)", self.segments.len());
        self.state = State::Revealing;
        self.begin_segment(now);
        true
    }

    /// Run whatever is due at `now`. Calling it again with the same `now`
    /// does nothing.
    pub fn advance(&mut self, now: Millis) {
        match self.state {
            State::Idle => {}
            State::SegmentPause { since } => {
                if elapsed(since, now) >= self.timing.segment_pause_ms {
                    self.segment_index += 1;
                    if self.segment_index < self.segments.len() {
                        self.char_index = 0;
                        self.state = State::Revealing;
                        self.begin_segment(now);
                    } else {
                        self.finish();
                    }
                }
            }
            State::Revealing => {
                if elapsed(self.last_reveal_at, now) >= self.timing.char_interval_ms {
                    self.step(now);
                }
            }
        }

        if self.mouth_close.fire(now) {
            self.surface.set_mouth_aperture(CLOSED);
        }
        if self.auto_clear.fire(now) {
            self.surface.clear_text();
        }
    }

    /// Halt immediately. Pending close/clear actions are dropped unfired.
    pub fn stop(&mut self) {
        self.state = State::Idle;
        self.mouth_close.cancel();
        self.auto_clear.cancel();
    }

    /// Clear the balloon, close the mouth and stop
    pub fn clear(&mut self) {
        self.surface.clear_text();
        self.surface.set_mouth_aperture(CLOSED);
        self.stop();
    }

    pub fn is_animating(&self) -> bool {
        self.state != State::Idle
    }

    /// True while a close or clear action is still waiting to fire
    pub fn has_pending_effects(&self) -> bool {
        self.mouth_close.is_pending() || self.auto_clear.is_pending()
    }

    pub fn set_tone_frequency(&mut self, hz: u32) {
        log::debug!("tone frequency set to {} Hz", hz);
        self.tone_frequency = hz;
    }

    pub fn tone_frequency(&self) -> u32 {
        self.tone_frequency
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Idle => Phase::Idle,
            State::Revealing => Phase::Revealing,
            State::SegmentPause { .. } => Phase::SegmentPause,
        }
    }

    pub fn progress(&self) -> Progress {
        Progress {
            phase: self.phase(),
            segment_index: self.segment_index,
            segment_count: self.segments.len(),
            char_index: self.char_index,
            mouth_close_pending: self.mouth_close.is_pending(),
            clear_pending: self.auto_clear.is_pending(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    fn begin_segment(&mut self, now: Millis) {
        let Some(segment) = self.segments.get(self.segment_index) else {
            return;
        };
        log::debug!(
            "segment {}: {:?} / {:?}",
            self.segment_index,
            segment.display,
            segment.phonetic
        );
        let first = lossy(char_at(segment.display.as_bytes(), 0).unwrap_or_default()).into_owned();
        let aperture = aperture_for(char_at(segment.phonetic.as_bytes(), 0).unwrap_or_default());
        self.reveal(&first, aperture, now);
    }

    fn step(&mut self, now: Millis) {
        self.char_index += 1;
        let Some(segment) = self.segments.get(self.segment_index) else {
            self.finish();
            return;
        };

        if self.char_index >= segment.reveal_len() {
            if self.segment_index + 1 < self.segments.len() {
                log::debug!("segment {} complete, pausing", self.segment_index);
                self.state = State::SegmentPause { since: now };
            } else {
                log::debug!("all segments complete");
                self.finish();
            }
            return;
        }

        let shown = display_index(self.char_index, segment.display_len, segment.phonetic_len);
        let window_start = (shown + 1).saturating_sub(self.timing.max_display_chars);
        let text = lossy(span(segment.display.as_bytes(), window_start, shown + 1)).into_owned();
        let aperture =
            aperture_for(char_at(segment.phonetic.as_bytes(), self.char_index).unwrap_or_default());
        self.reveal(&text, aperture, now);
    }

    fn reveal(&mut self, text: &str, aperture: f32, now: Millis) {
        self.surface.render_partial_text(text);
        self.surface.set_mouth_aperture(aperture);
        self.surface
            .emit_tone(self.tone_frequency, self.timing.beep_duration_ms);
        self.last_reveal_at = now;
    }

    fn finish(&mut self) {
        self.state = State::Idle;
        self.mouth_close
            .schedule(self.last_reveal_at + self.timing.mouth_close_delay_ms);
        self.auto_clear
            .schedule(self.last_reveal_at + self.timing.clear_delay_ms);
    }
}
