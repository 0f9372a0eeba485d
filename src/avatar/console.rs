//! Avatar that reports to the log
//!
//! Stands in for a real face: balloon text, mouth and gestures become log
//! lines. Tones go to an optional [`ToneOutput`].

use std::fmt;
use std::time::Instant;

use crate::avatar::{Expression, GestureOutcome, Gestures, Motion, Pose, SpeechSurface};
use crate::sound::ToneOutput;
use crate::time::Millis;

pub struct ConsoleAvatar {
    balloon: String,
    mouth: f32,
    expression: Expression,
    eyes_open: bool,
    auto_blink: bool,
    motion: Option<(Motion, Instant)>,
    tone: Option<Box<dyn ToneOutput>>,
}

impl fmt::Debug for ConsoleAvatar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleAvatar")
            .field("balloon", &self.balloon)
            .field("mouth", &self.mouth)
            .field("expression", &self.expression)
            .field("eyes_open", &self.eyes_open)
            .field("motion", &self.motion.map(|(m, _)| m))
            .field("tone", &self.tone.is_some())
            .finish()
    }
}

impl Default for ConsoleAvatar {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleAvatar {
    pub fn new() -> Self {
        Self {
            balloon: String::new(),
            mouth: 0.0,
            expression: Expression::Neutral,
            eyes_open: true,
            auto_blink: true,
            motion: None,
            tone: None,
        }
    }

    pub fn with_tone_output(mut self, tone: Box<dyn ToneOutput>) -> Self {
        self.tone = Some(tone);
        self
    }

    pub fn balloon(&self) -> &str {
        &self.balloon
    }

    pub fn mouth(&self) -> f32 {
        self.mouth
    }

    pub fn expression(&self) -> Expression {
        self.expression
    }

    pub fn eyes_open(&self) -> bool {
        self.eyes_open
    }

    pub fn auto_blink(&self) -> bool {
        self.auto_blink
    }

    /// Current head pose, following the motion in progress
    pub fn pose(&self) -> Pose {
        match self.motion {
            Some((motion, started)) => motion.pose_at(started.elapsed().as_millis() as Millis),
            None => Pose::HOME,
        }
    }
}

impl SpeechSurface for ConsoleAvatar {
    fn render_partial_text(&mut self, text: &str) {
        if text != self.balloon {
            log::info!("[balloon] {}", text);
            self.balloon = text.to_string();
        }
    }

    fn set_mouth_aperture(&mut self, ratio: f32) {
        self.mouth = ratio.clamp(0.0, 1.0);
        log::debug!("[mouth] {:.1}", self.mouth);
    }

    fn emit_tone(&mut self, frequency_hz: u32, duration_ms: Millis) {
        log::debug!("[tone] {} Hz, {} ms", frequency_hz, duration_ms);
        if let Some(tone) = self.tone.as_mut() {
            tone.play(frequency_hz, duration_ms);
        }
    }

    fn clear_text(&mut self) {
        if !self.balloon.is_empty() {
            log::info!("[balloon] cleared");
        }
        self.balloon.clear();
    }
}

impl Gestures for ConsoleAvatar {
    fn set_expression(&mut self, name: &str) -> GestureOutcome {
        let Some(expression) = Expression::from_name(name) else {
            return GestureOutcome::Unknown;
        };
        self.expression = expression;
        let closed = expression.closes_eyes();
        self.eyes_open = !closed;
        self.auto_blink = !closed;
        log::info!("[face] {}{}", expression, if closed { " (eyes closed)" } else { "" });
        GestureOutcome::Applied
    }

    fn perform_motion(&mut self, name: &str) -> GestureOutcome {
        let Some(motion) = Motion::from_name(name) else {
            return GestureOutcome::Unknown;
        };
        if self.is_moving() {
            return GestureOutcome::Skipped;
        }
        for frame in motion.keyframes() {
            log::debug!(
                "[motion] {} {:?} -> {} deg in {} ms",
                motion,
                frame.axis,
                frame.target_deg,
                frame.duration_ms
            );
        }
        log::info!("[motion] {}", motion);
        self.motion = Some((motion, Instant::now()));
        GestureOutcome::Applied
    }

    fn is_moving(&self) -> bool {
        match self.motion {
            Some((motion, started)) => (started.elapsed().as_millis() as Millis) < motion.duration_ms(),
            None => false,
        }
    }
}
