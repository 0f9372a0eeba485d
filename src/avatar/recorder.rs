//! Avatar that records every call, for tests and dry runs

use crate::avatar::{Expression, GestureOutcome, Gestures, Motion, SpeechSurface};
use crate::time::Millis;

/// One call into the avatar
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Render(String),
    Mouth(f32),
    Tone { hz: u32, ms: Millis },
    Clear,
    Expression(Expression),
    Motion(Motion),
}

#[derive(Debug, Clone, Default)]
pub struct RecordingAvatar {
    effects: Vec<Effect>,
    balloon: String,
    mouth: f32,
    moving: bool,
}

impl RecordingAvatar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend a motion is (or is no longer) playing
    pub fn set_moving(&mut self, moving: bool) {
        self.moving = moving;
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Drain the recorded effects
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn balloon(&self) -> &str {
        &self.balloon
    }

    pub fn mouth(&self) -> f32 {
        self.mouth
    }

    pub fn rendered(&self) -> Vec<String> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Render(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn mouth_updates(&self) -> Vec<f32> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Mouth(ratio) => Some(*ratio),
                _ => None,
            })
            .collect()
    }

    pub fn tones(&self) -> Vec<(u32, Millis)> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Tone { hz, ms } => Some((*hz, *ms)),
                _ => None,
            })
            .collect()
    }
}

impl SpeechSurface for RecordingAvatar {
    fn render_partial_text(&mut self, text: &str) {
        self.balloon = text.to_string();
        self.effects.push(Effect::Render(text.to_string()));
    }

    fn set_mouth_aperture(&mut self, ratio: f32) {
        self.mouth = ratio;
        self.effects.push(Effect::Mouth(ratio));
    }

    fn emit_tone(&mut self, frequency_hz: u32, duration_ms: Millis) {
        self.effects.push(Effect::Tone {
            hz: frequency_hz,
            ms: duration_ms,
        });
    }

    fn clear_text(&mut self) {
        self.balloon.clear();
        self.effects.push(Effect::Clear);
    }
}

impl Gestures for RecordingAvatar {
    fn set_expression(&mut self, name: &str) -> GestureOutcome {
        match Expression::from_name(name) {
            Some(expression) => {
                self.effects.push(Effect::Expression(expression));
                GestureOutcome::Applied
            }
            None => GestureOutcome::Unknown,
        }
    }

    fn perform_motion(&mut self, name: &str) -> GestureOutcome {
        match Motion::from_name(name) {
            None => GestureOutcome::Unknown,
            Some(_) if self.moving => GestureOutcome::Skipped,
            Some(motion) => {
                self.effects.push(Effect::Motion(motion));
                GestureOutcome::Applied
            }
        }
    }

    fn is_moving(&self) -> bool {
        self.moving
    }
}
