//! In-memory backend for exercising the controller without an audio device.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use crate::error::{PlayerError, Result};
use crate::library::Track;

use super::backend::{Backend, PrepareNotifier, Voice};

#[derive(Debug, Default)]
pub struct FakeState {
    /// Voices opened and not yet released.
    pub open: usize,
    pub max_open: usize,
    pub opened: usize,
    pub released: usize,
    pub playing: bool,
    pub position: Duration,
    pub gain: Option<f32>,
    pub looping: bool,
    pub seeks: Vec<Duration>,
    /// Prepare requests held back until [`FakeBackend::finish_prepare`].
    pub pending: Vec<PrepareNotifier>,
    pub unplayable: HashSet<PathBuf>,
    pub fail_release: bool,
}

#[derive(Debug, Clone)]
pub struct FakeBackend {
    pub state: Rc<RefCell<FakeState>>,
    /// What prepared voices report as their length.
    pub duration: Option<Duration>,
    /// Prepare synchronously instead of queueing in `pending`.
    pub auto_prepare: bool,
}

impl FakeBackend {
    pub fn new(duration: Duration) -> Self {
        Self {
            state: Rc::new(RefCell::new(FakeState::default())),
            duration: Some(duration),
            auto_prepare: true,
        }
    }

    pub fn deferred(duration: Duration) -> Self {
        Self {
            auto_prepare: false,
            ..Self::new(duration)
        }
    }

    /// Complete the oldest held-back prepare.
    pub fn finish_prepare(&self) {
        let notifier = self.state.borrow_mut().pending.remove(0);
        notifier.prepared(self.duration);
    }

    pub fn fail_prepare(&self, reason: &str) {
        let notifier = self.state.borrow_mut().pending.remove(0);
        notifier.failed(reason);
    }

    pub fn set_position(&self, position: Duration) {
        self.state.borrow_mut().position = position;
    }

    pub fn open_count(&self) -> usize {
        self.state.borrow().open
    }
}

impl Backend for FakeBackend {
    type Voice = FakeVoice;

    fn open(&mut self, track: &Track) -> Result<FakeVoice> {
        let mut s = self.state.borrow_mut();
        if s.unplayable.contains(&track.path) {
            return Err(PlayerError::UnplayableSource {
                path: track.path.clone(),
                reason: "unsupported format".into(),
            });
        }
        s.open += 1;
        s.opened += 1;
        s.max_open = s.max_open.max(s.open);
        s.position = Duration::ZERO;
        s.playing = false;

        Ok(FakeVoice {
            state: Rc::clone(&self.state),
            duration: self.duration,
            auto_prepare: self.auto_prepare,
        })
    }
}

#[derive(Debug)]
pub struct FakeVoice {
    state: Rc<RefCell<FakeState>>,
    duration: Option<Duration>,
    auto_prepare: bool,
}

impl Voice for FakeVoice {
    fn prepare(&mut self, notifier: PrepareNotifier) {
        if self.auto_prepare {
            notifier.prepared(self.duration);
        } else {
            self.state.borrow_mut().pending.push(notifier);
        }
    }

    fn start(&mut self) {
        self.state.borrow_mut().playing = true;
    }

    fn pause(&mut self) {
        self.state.borrow_mut().playing = false;
    }

    fn stop(&mut self) {
        self.state.borrow_mut().playing = false;
    }

    fn release(self) -> Result<()> {
        let mut s = self.state.borrow_mut();
        s.open -= 1;
        s.released += 1;
        if s.fail_release {
            return Err(PlayerError::OutputDevice("release refused".into()));
        }
        Ok(())
    }

    fn seek_to(&mut self, position: Duration) -> Result<()> {
        let mut s = self.state.borrow_mut();
        s.position = position;
        s.seeks.push(position);
        Ok(())
    }

    fn position(&self) -> Duration {
        self.state.borrow().position
    }

    fn set_volume(&mut self, gain: f32) {
        self.state.borrow_mut().gain = Some(gain);
    }

    fn set_looping(&mut self, looping: bool) {
        self.state.borrow_mut().looping = looping;
    }
}
