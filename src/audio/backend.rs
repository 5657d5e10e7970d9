//! The seam between the controller and whatever actually decodes audio.

use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::error::Result;
use crate::library::Track;

use super::types::{Generation, Wakeup};

/// Single-shot completion handle for [`Voice::prepare`].
///
/// Consumed by either `prepared` or `failed`, so a session can report at most
/// once. It is `Send`: decoders may finish preparing on a worker thread.
#[derive(Debug)]
pub struct PrepareNotifier {
    generation: Generation,
    tx: Sender<Wakeup>,
}

impl PrepareNotifier {
    pub(crate) fn new(generation: Generation, tx: Sender<Wakeup>) -> Self {
        Self { generation, tx }
    }

    pub fn prepared(self, duration: Option<Duration>) {
        self.send(Wakeup::Prepared {
            generation: self.generation,
            duration,
        });
    }

    pub fn failed(self, reason: impl Into<String>) {
        self.send(Wakeup::PrepareFailed {
            generation: self.generation,
            reason: reason.into(),
        });
    }

    fn send(&self, wakeup: Wakeup) {
        // The receiver only goes away on shutdown; nobody is left to tell.
        if self.tx.send(wakeup).is_err() {
            tracing::debug!(generation = self.generation, "wakeup receiver dropped");
        }
    }
}

/// An open decoder/player handle bound to one source.
pub trait Voice {
    /// Begin preparing. Must eventually consume `notifier`, from any thread,
    /// unless the voice is released first.
    fn prepare(&mut self, notifier: PrepareNotifier);
    fn start(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    /// Give the native resource back. The handle is gone afterwards either way.
    fn release(self) -> Result<()>;
    fn seek_to(&mut self, position: Duration) -> Result<()>;
    /// Current playback position. Looping voices may report past the end.
    fn position(&self) -> Duration;
    /// Linear gain in `[0, 1]`, applied to both channels.
    fn set_volume(&mut self, gain: f32);
    fn set_looping(&mut self, looping: bool);
}

/// Opens voices. Implementations fail with `UnplayableSource` when the track
/// cannot be opened.
pub trait Backend {
    type Voice: Voice;

    fn open(&mut self, track: &Track) -> Result<Self::Voice>;
}
