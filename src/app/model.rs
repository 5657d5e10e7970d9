//! Application model: `App` and the previous-track memory.
//!
//! `App` is what the key bindings talk to. It owns the catalog and the
//! playback controller and implements the composite "next" and "previous"
//! behaviour on top of the controller's primitives.

use std::time::Duration;

use rand::rngs::StdRng;

use crate::audio::{Backend, PlaybackController, PlayerEvent, PlayerState, VolumeSlider};
use crate::catalog::TrackCatalog;
use crate::config::Settings;
use crate::error::{PlayerError, Result};

/// Catalog index of the track that was current before the last "next".
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct PreviousTrack(Option<usize>);

impl PreviousTrack {
    pub fn remember(&mut self, index: usize) {
        self.0 = Some(index);
    }

    pub fn get(&self) -> Option<usize> {
        self.0
    }
}

/// Format as `m:ss`.
pub fn format_clock(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

pub struct App<B: Backend> {
    pub catalog: TrackCatalog,
    pub player: PlaybackController<B>,
    pub previous_track: PreviousTrack,
    pub volume: VolumeSlider,

    /// The user wants sound: start the next session as soon as it is ready.
    pub play_requested: bool,

    pub elapsed: Duration,
    pub remaining: Duration,
    pub duration: Duration,
    /// Last problem worth showing in the status line.
    pub status: Option<String>,

    replay_threshold: Duration,
    scrub: Duration,
    volume_step: u32,
    rng: StdRng,
}

impl<B: Backend> App<B> {
    pub fn new(
        catalog: TrackCatalog,
        mut player: PlaybackController<B>,
        settings: &Settings,
        rng: StdRng,
    ) -> Self {
        let volume = VolumeSlider::new(settings.audio.initial_volume, settings.audio.volume_max);
        player.set_volume(volume);

        Self {
            catalog,
            player,
            previous_track: PreviousTrack::default(),
            volume,
            play_requested: false,
            elapsed: Duration::ZERO,
            remaining: Duration::ZERO,
            duration: Duration::ZERO,
            status: None,
            replay_threshold: Duration::from_millis(settings.controls.replay_threshold_ms),
            scrub: Duration::from_secs(settings.controls.scrub_seconds),
            volume_step: settings.controls.volume_step,
            rng,
        }
    }

    /// Cue a random track without starting it.
    pub fn start(&mut self) -> Result<()> {
        let index = self.catalog.random_index(&mut self.rng)?;
        self.load_index(index)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.player.current_track().map(|t| t.index)
    }

    pub fn now_playing(&self) -> Option<String> {
        self.player.current_track().map(|t| t.to_string())
    }

    pub fn toggle_play(&mut self) -> Result<()> {
        if self.player.is_playing() {
            self.play_requested = false;
            return self.player.pause();
        }

        // A second press before the session is ready withdraws the request.
        if self.player.state() == PlayerState::Loading && self.play_requested {
            self.play_requested = false;
            return Ok(());
        }

        self.play_requested = true;
        match self.player.play() {
            // Picked up by `on_event` once the session is ready.
            Err(PlayerError::NotReady(PlayerState::Loading)) => Ok(()),
            other => other,
        }
    }

    /// Remember the current track and move to a random different one.
    pub fn next(&mut self) -> Result<()> {
        let current = self.current_index();
        let pick = match current {
            Some(c) => self.catalog.random_index_excluding(c, &mut self.rng),
            None => self.catalog.random_index(&mut self.rng),
        };

        let index = match pick {
            Ok(i) => i,
            Err(PlayerError::NoAlternativeTrack) => {
                tracing::debug!("single-track catalog, restarting current track");
                return self.restart_current();
            }
            Err(e) => return Err(e),
        };

        if let Some(c) = current {
            self.previous_track.remember(c);
        }
        self.play_requested = true;
        self.load_index(index)
    }

    /// Restart the current track once it has played past the threshold,
    /// otherwise go back to the remembered track. The memory is left as is.
    pub fn previous(&mut self) -> Result<()> {
        let elapsed = self.player.elapsed().unwrap_or(Duration::ZERO);
        if elapsed > self.replay_threshold {
            return self.replay();
        }

        match self.previous_track.get() {
            Some(index) => {
                self.play_requested = true;
                self.load_index(index)
            }
            None => self.restart_current(),
        }
    }

    pub fn replay(&mut self) -> Result<()> {
        self.player.replay()?;
        self.refresh_clock();
        Ok(())
    }

    pub fn scrub_forward(&mut self) -> Result<()> {
        self.seek_to(millis(self.elapsed).saturating_add(millis(self.scrub)))
    }

    pub fn scrub_back(&mut self) -> Result<()> {
        self.seek_to(millis(self.elapsed).saturating_sub(millis(self.scrub)))
    }

    pub fn seek_to(&mut self, position_ms: i64) -> Result<()> {
        self.player.seek(position_ms)?;
        self.refresh_clock();
        Ok(())
    }

    pub fn volume_up(&mut self) {
        self.volume.raise(self.volume_step);
        self.player.set_volume(self.volume);
    }

    pub fn volume_down(&mut self) {
        self.volume.lower(self.volume_step);
        self.player.set_volume(self.volume);
    }

    /// React to a controller notification.
    pub fn on_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Ready { duration, .. } => {
                self.duration = duration;
                self.status = None;
                self.refresh_clock();
                if self.play_requested {
                    if let Err(e) = self.player.play() {
                        self.report(&e);
                    }
                }
            }
            PlayerEvent::Tick { elapsed, remaining } => {
                self.elapsed = elapsed;
                self.remaining = remaining;
            }
            PlayerEvent::LoadFailed { track, reason } => {
                let name = self
                    .catalog
                    .track_at(track)
                    .map(|t| t.to_string())
                    .unwrap_or_else(|_| format!("track {track}"));
                self.status = Some(format!("cannot play {name}: {reason}"));
            }
        }
    }

    pub fn report(&mut self, error: &PlayerError) {
        tracing::warn!(%error, "command failed");
        self.status = Some(error.to_string());
    }

    pub fn played_label(&self) -> String {
        format_clock(self.elapsed)
    }

    pub fn remaining_label(&self) -> String {
        format!("-{}", format_clock(self.remaining))
    }

    /// Progress through the current track in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    fn load_index(&mut self, index: usize) -> Result<()> {
        let track = self.catalog.track_at(index)?.clone();
        self.elapsed = Duration::ZERO;
        self.remaining = Duration::ZERO;
        self.duration = track.duration.unwrap_or(Duration::ZERO);
        self.player.load(&track)
    }

    /// Rewind the current track and make sure it plays.
    fn restart_current(&mut self) -> Result<()> {
        if !self.player.state().is_loaded() {
            return Ok(());
        }
        self.player.replay()?;
        self.play_requested = true;
        self.player.play()?;
        self.refresh_clock();
        Ok(())
    }

    fn refresh_clock(&mut self) {
        if let (Ok(elapsed), Ok(remaining)) = (self.player.elapsed(), self.player.remaining()) {
            self.elapsed = elapsed;
            self.remaining = remaining;
        }
    }
}
