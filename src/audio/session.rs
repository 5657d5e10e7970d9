use std::time::Duration;

use crate::library::Track;

use super::backend::Voice;
use super::types::Generation;

/// The live binding between a track and its open voice.
pub(super) struct Session<V> {
    pub track: Track,
    pub voice: V,
    pub generation: Generation,
    /// Known once the voice reports it is prepared.
    pub duration: Option<Duration>,
    pub looping: bool,
}

impl<V: Voice> Session<V> {
    pub fn new(track: Track, voice: V, generation: Generation, looping: bool) -> Self {
        Self {
            track,
            voice,
            generation,
            duration: None,
            looping,
        }
    }

    pub fn is_prepared(&self) -> bool {
        self.duration.is_some()
    }

    /// Position within the current pass over the track, never past its end.
    pub fn elapsed(&self) -> Duration {
        let pos = self.voice.position();
        match self.duration {
            Some(d) if d.is_zero() => Duration::ZERO,
            Some(d) if self.looping => wrap(pos, d),
            Some(d) => pos.min(d),
            None => Duration::ZERO,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.duration
            .unwrap_or(Duration::ZERO)
            .saturating_sub(self.elapsed())
    }
}

fn wrap(pos: Duration, len: Duration) -> Duration {
    let len_nanos = len.as_nanos();
    let nanos = pos.as_nanos() % len_nanos;
    Duration::from_nanos(nanos as u64)
}
