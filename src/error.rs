//! Error types shared by the catalog and the playback controller.

use std::path::PathBuf;

use thiserror::Error;

use crate::audio::PlayerState;

#[derive(Debug, Error)]
pub enum PlayerError {
    /// The catalog holds no tracks, so nothing can be picked.
    #[error("no playable tracks in the catalog")]
    EmptyCatalog,

    #[error("track index {index} out of range (catalog has {len} tracks)")]
    IndexOutOfRange { index: usize, len: usize },

    /// A random pick was asked to avoid the only track there is.
    #[error("no other track to pick from")]
    NoAlternativeTrack,

    #[error("cannot play {path:?}: {reason}")]
    UnplayableSource { path: PathBuf, reason: String },

    /// The operation needs a prepared session.
    #[error("player is not ready (state: {0:?})")]
    NotReady(PlayerState),

    #[error("audio output unavailable: {0}")]
    OutputDevice(String),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
