//! Sine-wave beeps through rodio
//!
//! rodio's `OutputStream` is not `Send`, so it lives on a dedicated thread
//! that owns the stream and a single `Sink`. The poll loop only sends
//! commands over a channel and never waits on audio.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::source::SineWave;
use rodio::{OutputStream, Sink, Source};

use crate::sound::{volume_to_gain, AudioError, ToneOutput};
use crate::time::Millis;

enum ToneCommand {
    Play { hz: u32, duration_ms: Millis },
    Shutdown,
}

/// Handle to the audio thread
pub struct TonePlayer {
    sender: Sender<ToneCommand>,
    thread: Option<JoinHandle<()>>,
}

fn tone_thread_main(rx: Receiver<ToneCommand>, gain: f32, ready: Sender<Result<(), String>>) {
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(s) => s,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };
    let sink = match Sink::try_new(&handle) {
        Ok(sink) => sink,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };
    let _ = ready.send(Ok(()));
    log::debug!("tone thread started");

    while let Ok(cmd) = rx.recv() {
        match cmd {
            ToneCommand::Play { hz, duration_ms } => {
                // A new beep cuts off whatever is still sounding; clear() also
                // pauses, hence the play() below
                sink.clear();
                let source = SineWave::new(hz as f32)
                    .take_duration(Duration::from_millis(duration_ms))
                    .amplify(gain);
                sink.append(source);
                sink.play();
            }
            ToneCommand::Shutdown => break,
        }
    }
    log::debug!("tone thread exiting");
}

impl TonePlayer {
    /// Open the default output device. `volume` is 0-100.
    pub fn spawn(volume: u8) -> Result<Self, AudioError> {
        let (tx, rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();
        let gain = volume_to_gain(volume);

        let thread = thread::Builder::new()
            .name("tone".to_string())
            .spawn(move || tone_thread_main(rx, gain, ready_tx))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                sender: tx,
                thread: Some(thread),
            }),
            Ok(Err(reason)) => {
                let _ = thread.join();
                Err(AudioError::NoDevice(reason))
            }
            Err(_) => Err(AudioError::ThreadGone),
        }
    }
}

impl ToneOutput for TonePlayer {
    fn play(&mut self, frequency_hz: u32, duration_ms: Millis) {
        if self
            .sender
            .send(ToneCommand::Play {
                hz: frequency_hz,
                duration_ms,
            })
            .is_err()
        {
            log::warn!("tone thread is gone, beep dropped");
        }
    }
}

impl Drop for TonePlayer {
    fn drop(&mut self) {
        let _ = self.sender.send(ToneCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
