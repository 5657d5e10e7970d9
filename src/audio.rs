//! Audio: the playback controller and the decoder backends it drives.

mod backend;
mod controller;
mod session;
mod sink;
mod ticker;
mod types;
mod volume;

#[cfg(test)]
pub(crate) mod fake;

pub use backend::{Backend, PrepareNotifier, Voice};
pub use controller::PlaybackController;
pub use sink::RodioBackend;
pub use types::{Generation, PlayerEvent, PlayerState, Wakeup};
pub use volume::{VolumeSlider, slider_to_gain};

#[cfg(test)]
mod tests;
