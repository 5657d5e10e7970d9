//! Audio-related small types.
//!
//! This module defines the controller state machine's states, the
//! notifications it emits to the UI and the wakeups it receives from the
//! decoder.

use std::time::Duration;

/// Identifies one playback session. Every `load` gets a fresh generation, so a
/// notification raised by an older session can be recognised and dropped.
pub type Generation = u64;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlayerState {
    /// No session.
    #[default]
    Idle,
    /// Session opened, decoder still preparing.
    Loading,
    /// Prepared but never started.
    Ready,
    Playing,
    Paused,
}

impl PlayerState {
    /// `Ready`, `Playing` and `Paused`: a prepared session with a known duration.
    pub fn is_loaded(self) -> bool {
        matches!(self, Self::Ready | Self::Playing | Self::Paused)
    }
}

/// Notifications for the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// Emitted exactly once per successful `load`, when the decoder is prepared.
    Ready { track: usize, duration: Duration },
    /// Periodic progress while playing.
    Tick {
        elapsed: Duration,
        remaining: Duration,
    },
    /// The decoder gave up on the track after `load` returned.
    LoadFailed { track: usize, reason: String },
}

/// Asynchronous results from the decoder, routed back to the owning thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wakeup {
    Prepared {
        generation: Generation,
        /// `None` when the decoder cannot tell the length up front.
        duration: Option<Duration>,
    },
    PrepareFailed {
        generation: Generation,
        reason: String,
    },
}

impl Wakeup {
    pub fn generation(&self) -> Generation {
        match self {
            Self::Prepared { generation, .. } | Self::PrepareFailed { generation, .. } => {
                *generation
            }
        }
    }
}
