//! Playback state machine: one session at a time, transport commands, and the
//! progress ticker.
//!
//! All methods run on the thread that owns the controller. The decoder reports
//! back through [`Wakeup`]s which the owner feeds to
//! [`PlaybackController::handle_wakeup`]; UI-facing notifications go out on the
//! [`PlayerEvent`] channel given at construction.

use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use crate::config::AudioSettings;
use crate::error::{PlayerError, Result};
use crate::library::Track;

use super::backend::{Backend, PrepareNotifier, Voice};
use super::session::Session;
use super::ticker::Ticker;
use super::types::{Generation, PlayerEvent, PlayerState, Wakeup};
use super::volume::VolumeSlider;

pub struct PlaybackController<B: Backend> {
    backend: B,
    session: Option<Session<B::Voice>>,
    state: PlayerState,
    last_generation: Generation,
    ticker: Ticker,
    looping: bool,
    gain: f32,
    events: Sender<PlayerEvent>,
    wakeups: Sender<Wakeup>,
}

impl<B: Backend> PlaybackController<B> {
    pub fn new(
        backend: B,
        settings: &AudioSettings,
        events: Sender<PlayerEvent>,
        wakeups: Sender<Wakeup>,
    ) -> Self {
        Self {
            backend,
            session: None,
            state: PlayerState::Idle,
            last_generation: 0,
            ticker: Ticker::new(Duration::from_millis(settings.tick_ms)),
            looping: settings.looping,
            gain: VolumeSlider::new(settings.initial_volume, settings.volume_max).gain(),
            events,
            wakeups,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.session.as_ref().map(|s| &s.track)
    }

    /// When the event loop next needs to call [`Self::poll`].
    pub fn next_deadline(&self) -> Option<Instant> {
        self.ticker.deadline()
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Replace whatever is loaded with `track` and start preparing it.
    ///
    /// The old voice is stopped and released before the new one is opened. On
    /// `UnplayableSource` the controller is left `Idle`.
    pub fn load(&mut self, track: &Track) -> Result<()> {
        self.stop();

        let mut voice = self.backend.open(track).inspect_err(|e| {
            tracing::warn!(path = %track.path.display(), error = %e, "open failed");
        })?;

        self.last_generation += 1;
        let generation = self.last_generation;

        voice.set_looping(self.looping);
        voice.prepare(PrepareNotifier::new(generation, self.wakeups.clone()));

        self.session = Some(Session::new(track.clone(), voice, generation, self.looping));
        self.state = PlayerState::Loading;
        tracing::debug!(generation, track = track.index, "loading {}", track);
        Ok(())
    }

    /// Apply a decoder notification. Wakeups from a superseded session, or
    /// repeats for one that already settled, are dropped.
    pub fn handle_wakeup(&mut self, wakeup: Wakeup) {
        let generation = wakeup.generation();
        let current = self.session.as_ref().map(|s| s.generation);
        if current != Some(generation) || self.state != PlayerState::Loading {
            tracing::debug!(generation, ?current, state = ?self.state, "discarding stale wakeup");
            return;
        }

        match wakeup {
            Wakeup::Prepared { duration, .. } => {
                let gain = self.gain;
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                let duration = duration
                    .or(session.track.duration)
                    .unwrap_or(Duration::ZERO);
                session.duration = Some(duration);
                session.voice.set_volume(gain);
                let track = session.track.index;

                self.state = PlayerState::Ready;
                tracing::debug!(generation, ?duration, "session ready");
                self.emit(PlayerEvent::Ready { track, duration });
            }
            Wakeup::PrepareFailed { reason, .. } => {
                let track = self.session.as_ref().map_or(0, |s| s.track.index);
                tracing::warn!(generation, %reason, "prepare failed");
                self.release_session();
                self.emit(PlayerEvent::LoadFailed { track, reason });
            }
        }
    }

    /// Start or resume. A no-op while already playing.
    pub fn play(&mut self) -> Result<()> {
        match self.state {
            PlayerState::Ready | PlayerState::Paused => {
                let session = self
                    .session
                    .as_mut()
                    .ok_or(PlayerError::NotReady(self.state))?;
                session.voice.start();
                self.ticker.arm(session.generation, Instant::now());
                self.state = PlayerState::Playing;
                tracing::debug!(generation = session.generation, "playing");
                Ok(())
            }
            PlayerState::Playing => Ok(()),
            state => Err(PlayerError::NotReady(state)),
        }
    }

    /// Halt playback and the ticker. A no-op when already paused or never started.
    pub fn pause(&mut self) -> Result<()> {
        match self.state {
            PlayerState::Playing => {
                self.ticker.cancel();
                if let Some(session) = self.session.as_mut() {
                    session.voice.pause();
                }
                self.state = PlayerState::Paused;
                tracing::debug!("paused");
                Ok(())
            }
            PlayerState::Paused | PlayerState::Ready => Ok(()),
            state => Err(PlayerError::NotReady(state)),
        }
    }

    /// Stop and release the current session, if any.
    pub fn stop(&mut self) {
        if self.session.is_some() {
            tracing::debug!(state = ?self.state, "stopping");
        }
        self.release_session();
    }

    /// Rewind to the start, keeping play/pause state.
    pub fn replay(&mut self) -> Result<()> {
        self.loaded_session_mut()?.voice.seek_to(Duration::ZERO)
    }

    /// Seek to `position_ms`, clamped to `[0, duration]`. Returns where it landed.
    pub fn seek(&mut self, position_ms: i64) -> Result<Duration> {
        let session = self.loaded_session_mut()?;
        let duration = session.duration.unwrap_or(Duration::ZERO);
        let target = u64::try_from(position_ms)
            .map(Duration::from_millis)
            .unwrap_or(Duration::ZERO)
            .min(duration);
        session.voice.seek_to(target)?;
        Ok(target)
    }

    /// Take a new slider position. The gain sticks across loads and is applied
    /// to the current voice right away.
    pub fn set_volume(&mut self, slider: VolumeSlider) -> f32 {
        self.gain = slider.gain();
        if let Some(session) = self.session.as_mut() {
            session.voice.set_volume(self.gain);
        }
        self.gain
    }

    pub fn elapsed(&self) -> Result<Duration> {
        Ok(self.loaded_session()?.elapsed())
    }

    pub fn remaining(&self) -> Result<Duration> {
        Ok(self.loaded_session()?.remaining())
    }

    pub fn duration(&self) -> Result<Duration> {
        Ok(self
            .loaded_session()?
            .duration
            .unwrap_or(Duration::ZERO))
    }

    /// Emit a tick if one is due, and schedule the next while still playing.
    /// Returns whether a tick went out.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(generation) = self.ticker.take_due(now) else {
            return false;
        };
        let event = match self.session.as_ref() {
            Some(s) if s.generation == generation && self.state == PlayerState::Playing => {
                PlayerEvent::Tick {
                    elapsed: s.elapsed(),
                    remaining: s.remaining(),
                }
            }
            _ => {
                tracing::debug!(generation, "dropping stale tick");
                return false;
            }
        };

        self.emit(event);
        self.ticker.arm(generation, now);
        true
    }

    fn loaded_session(&self) -> Result<&Session<B::Voice>> {
        match self.session.as_ref() {
            Some(s) if self.state.is_loaded() && s.is_prepared() => Ok(s),
            _ => Err(PlayerError::NotReady(self.state)),
        }
    }

    fn loaded_session_mut(&mut self) -> Result<&mut Session<B::Voice>> {
        let state = self.state;
        match self.session.as_mut() {
            Some(s) if state.is_loaded() && s.is_prepared() => Ok(s),
            _ => Err(PlayerError::NotReady(state)),
        }
    }

    /// Drop to `Idle`. Release is best-effort; a failure is logged and the
    /// controller moves on regardless.
    fn release_session(&mut self) {
        self.ticker.cancel();
        self.state = PlayerState::Idle;
        if let Some(mut session) = self.session.take() {
            session.voice.stop();
            if let Err(e) = session.voice.release() {
                tracing::warn!(generation = session.generation, error = %e, "release failed");
            }
        }
    }

    fn emit(&self, event: PlayerEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("event receiver dropped");
        }
    }
}

impl<B: Backend> Drop for PlaybackController<B> {
    fn drop(&mut self) {
        self.release_session();
    }
}
