//! Speech pipeline controller
//!
//! Owns one [`Framer`] and one [`SpeechAnimator`] and moves data one way
//! through them: bytes, records, commands, avatar effects. The outer loop
//! calls [`Controller::feed`] with whatever bytes arrived and then
//! [`Controller::tick`] once.
//!
//! At most one utterance plays at a time. Text that arrives while the
//! animator is busy is rejected, not queued; gestures in the same command
//! still apply.

use crate::avatar::{Avatar, Expression, GestureOutcome};
use crate::comm::{interpret, Command, FrameStats, Framer, FramerLimits, SpeechCommand};
use crate::config::Options;
use crate::playlist::Playlist;
use crate::speech::{SpeechAnimator, Timing};
use crate::time::Millis;

/// What the controller did with one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// An utterance started
    Started { segments: usize },
    /// The animator was busy; the text was dropped
    Busy,
    DebugToggled(bool),
    UnknownCommand(String),
    /// Nothing to say
    NoText,
}

pub struct Controller<A: Avatar> {
    framer: Framer,
    animator: SpeechAnimator<A>,
    playlist: Playlist,
    debug: bool,
}

impl<A: Avatar> Controller<A> {
    pub fn new(avatar: A, options: &Options) -> Self {
        Self::with_settings(avatar, options.timing(), options.framer_limits(), options.debug)
    }

    pub fn with_settings(avatar: A, timing: Timing, limits: FramerLimits, debug: bool) -> Self {
        Self {
            framer: Framer::new(limits),
            animator: SpeechAnimator::new(avatar, timing),
            playlist: Playlist::builtin(),
            debug,
        }
    }

    pub fn with_playlist(mut self, playlist: Playlist) -> Self {
        self.playlist = playlist;
        self
    }

    /// Push received bytes through the framer and act on every record
    pub fn feed(&mut self, bytes: &[u8], now: Millis) -> Vec<Dispatch> {
        let records = self.framer.feed(bytes, now);
        records
            .into_iter()
            .map(|record| {
                if self.debug {
                    log::info!("record: {}", record);
                }
                let command = interpret(&record);
                self.dispatch(command, now)
            })
            .collect()
    }

    pub fn dispatch(&mut self, command: Command, now: Millis) -> Dispatch {
        match command {
            Command::DebugToggle(on) => {
                self.debug = on;
                log::info!("debug mode: {}", if on { "ON" } else { "OFF" });
                Dispatch::DebugToggled(on)
            }
            Command::UnknownCommand(name) => {
                if self.debug {
                    log::warn!("unknown command: {}", name);
                }
                Dispatch::UnknownCommand(name)
            }
            Command::Speech(speech) => self.handle_speech(&speech, now),
        }
    }

    /// Speak local text, under the same busy rule as remote commands
    pub fn speak(&mut self, display: &str, phonetic: &str, now: Millis) -> Dispatch {
        self.handle_speech(&SpeechCommand::text(display, phonetic), now)
    }

    /// Speak the next playlist line. A busy animator leaves the playlist
    /// where it was.
    pub fn speak_next_line(&mut self, now: Millis) -> Dispatch {
        if self.animator.is_animating() {
            return self.busy();
        }
        let Some(line) = self.playlist.next_line().cloned() else {
            return Dispatch::NoText;
        };
        self.speak(&line.display, &line.phonetic, now)
    }

    /// Advance the animation to `now`
    pub fn tick(&mut self, now: Millis) {
        self.animator.advance(now);
    }

    pub fn stop(&mut self) {
        self.animator.stop();
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    /// Animating, or a deferred mouth-close or clear still to fire
    pub fn has_pending_work(&self) -> bool {
        self.animator.is_animating() || self.animator.has_pending_effects()
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn stats(&self) -> FrameStats {
        self.framer.stats()
    }

    pub fn framer(&self) -> &Framer {
        &self.framer
    }

    pub fn animator(&self) -> &SpeechAnimator<A> {
        &self.animator
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn avatar(&self) -> &A {
        self.animator.surface()
    }

    pub fn avatar_mut(&mut self) -> &mut A {
        self.animator.surface_mut()
    }

    fn busy(&self) -> Dispatch {
        if self.debug {
            log::info!("animator is busy, message ignored");
        }
        Dispatch::Busy
    }

    fn handle_speech(&mut self, speech: &SpeechCommand, now: Millis) -> Dispatch {
        if self.debug {
            log::info!(
                "{:?} speech: display={:?} phonetic={:?} expression={:?} motion={:?}",
                speech.shape,
                speech.display,
                speech.phonetic,
                speech.expression,
                speech.motion
            );
        }

        if let Some(name) = speech.expression.as_deref() {
            self.apply_expression(name);
        }
        if let Some(name) = speech.motion.as_deref() {
            self.apply_motion(name);
        }

        if speech.display.is_empty() {
            return Dispatch::NoText;
        }
        if self.animator.is_animating() {
            return self.busy();
        }
        if self
            .animator
            .start(&speech.display, speech.phonetic_or_display(), now)
        {
            Dispatch::Started {
                segments: self.animator.progress().segment_count,
            }
        } else {
            Dispatch::NoText
        }
    }

    fn apply_expression(&mut self, name: &str) {
        match self.animator.surface_mut().set_expression(name) {
            GestureOutcome::Applied => {
                if let Some(expression) = Expression::from_name(name) {
                    self.animator.set_tone_frequency(expression.beep_frequency());
                }
            }
            GestureOutcome::Unknown => log::warn!("unknown expression: {}", name),
            GestureOutcome::Skipped => log::debug!("expression skipped: {}", name),
        }
    }

    fn apply_motion(&mut self, name: &str) {
        if self.animator.surface().is_moving() {
            log::info!("servo is moving, motion skipped: {}", name);
            return;
        }
        match self.animator.surface_mut().perform_motion(name) {
            GestureOutcome::Applied => {}
            GestureOutcome::Unknown => log::warn!("unknown motion: {}", name),
            GestureOutcome::Skipped => log::info!("motion skipped: {}", name),
        }
    }
}
