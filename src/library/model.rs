use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// A playable file and the metadata the scanner could read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
    /// Length from the file's tags/properties, if it could be read.
    pub duration: Option<Duration>,
    /// Position within the catalog the track belongs to.
    pub index: usize,
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}
