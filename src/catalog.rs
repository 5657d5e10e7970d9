//! The ordered set of tracks the player picks from.

use rand::Rng;

use crate::error::{PlayerError, Result};
use crate::library::Track;

/// Immutable snapshot of the scanned library.
///
/// Every track's `index` equals its position here, so an index handed out by
/// [`TrackCatalog::random_index_excluding`] can be fed straight back into
/// [`TrackCatalog::track_at`].
#[derive(Debug, Clone, Default)]
pub struct TrackCatalog {
    tracks: Vec<Track>,
}

impl TrackCatalog {
    pub fn new(mut tracks: Vec<Track>) -> Self {
        for (i, t) in tracks.iter_mut().enumerate() {
            t.index = i;
        }
        Self { tracks }
    }

    /// Number of tracks. An empty catalog is an error: nothing can be picked from it.
    pub fn size(&self) -> Result<usize> {
        match self.tracks.len() {
            0 => Err(PlayerError::EmptyCatalog),
            n => Ok(n),
        }
    }

    pub fn track_at(&self, index: usize) -> Result<&Track> {
        self.tracks.get(index).ok_or(PlayerError::IndexOutOfRange {
            index,
            len: self.tracks.len(),
        })
    }

    /// Uniform pick over the whole catalog.
    pub fn random_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize> {
        let len = self.size()?;
        Ok(rng.random_range(0..len))
    }

    /// Uniform pick over every index except `excluded`.
    ///
    /// A single-track catalog has no alternative and fails with
    /// [`PlayerError::NoAlternativeTrack`]. An `excluded` outside the catalog
    /// excludes nothing.
    pub fn random_index_excluding<R: Rng + ?Sized>(
        &self,
        excluded: usize,
        rng: &mut R,
    ) -> Result<usize> {
        let len = self.size()?;
        if excluded >= len {
            return Ok(rng.random_range(0..len));
        }
        if len == 1 {
            return Err(PlayerError::NoAlternativeTrack);
        }

        // Draw from the len - 1 remaining slots and step over the excluded one.
        let pick = rng.random_range(0..len - 1);
        Ok(if pick >= excluded { pick + 1 } else { pick })
    }
}
