//! `rodio` implementation of the decoder seam.
//!
//! Each voice owns a `Sink` on the shared output stream. Preparation (probing
//! and decoding the header) happens on a worker thread which appends the
//! source to the paused sink and then reports the duration. The worker only
//! holds a weak handle to the sink, so releasing the voice frees the sink and
//! the worker drops whatever it decoded. Seeking rebuilds the sink's queue
//! from the file with `skip_duration`.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::error::{PlayerError, Result};
use crate::library::Track;

use super::backend::{Backend, PrepareNotifier, Voice};

pub struct RodioBackend {
    stream: OutputStream,
}

impl RodioBackend {
    /// Open the system's default output device.
    pub fn open_default() -> Result<Self> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlayerError::OutputDevice(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped, which would scribble over the TUI.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }
}

impl Backend for RodioBackend {
    type Voice = RodioVoice;

    fn open(&mut self, track: &Track) -> Result<RodioVoice> {
        let file = File::open(&track.path).map_err(|e| unplayable(&track.path, e))?;

        let sink = Sink::connect_new(self.stream.mixer());
        sink.pause();

        Ok(RodioVoice {
            path: track.path.clone(),
            file: Some(file),
            sink: Arc::new(sink),
            released: Arc::new(AtomicBool::new(false)),
            offset: Duration::ZERO,
            looping: false,
        })
    }
}

pub struct RodioVoice {
    path: PathBuf,
    /// Handed to the prepare worker; `None` afterwards.
    file: Option<File>,
    sink: Arc<Sink>,
    /// Set on release; a prepare worker still decoding checks it before touching the sink.
    released: Arc<AtomicBool>,
    /// Where the head of the queue started, after a seek.
    offset: Duration,
    looping: bool,
}

fn unplayable(path: &Path, e: impl std::fmt::Display) -> PlayerError {
    PlayerError::UnplayableSource {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// The sink a prepare worker may still deliver into: alive and not released.
fn live_target<T>(target: &Weak<T>, released: &AtomicBool) -> Option<Arc<T>> {
    if released.load(Ordering::Acquire) {
        return None;
    }
    target.upgrade()
}

/// Playback position given the seek `offset`, the sink's reported `pos` and
/// how many sources are still `queued`.
///
/// After a seek the head source starts at `offset`. While looping, the tail
/// behind it restarts from zero, and once the head has drained the sink's
/// position counts from the tail's start.
fn voice_position(offset: Duration, pos: Duration, looping: bool, queued: usize) -> Duration {
    if looping && !offset.is_zero() && queued <= 1 {
        pos
    } else {
        offset + pos
    }
}

fn decode(file: File) -> std::result::Result<Decoder<BufReader<File>>, rodio::decoder::DecoderError> {
    Decoder::new(BufReader::new(file))
}

fn decode_path(path: &Path) -> Result<Decoder<BufReader<File>>> {
    let file = File::open(path).map_err(|e| unplayable(path, e))?;
    decode(file).map_err(|e| unplayable(path, e))
}

impl Voice for RodioVoice {
    fn prepare(&mut self, notifier: PrepareNotifier) {
        let Some(file) = self.file.take() else {
            notifier.failed("voice was already prepared");
            return;
        };
        let target = Arc::downgrade(&self.sink);
        let released = Arc::clone(&self.released);
        let looping = self.looping;
        let path = self.path.clone();

        thread::spawn(move || match decode(file) {
            Ok(source) => {
                let Some(sink) = live_target(&target, &released) else {
                    tracing::debug!(path = %path.display(), "voice released while preparing");
                    return;
                };
                let duration = source.total_duration();
                if looping {
                    sink.append(source.repeat_infinite());
                } else {
                    sink.append(source);
                }
                notifier.prepared(duration);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "decode failed");
                notifier.failed(e.to_string());
            }
        });
    }

    fn start(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn release(self) -> Result<()> {
        self.released.store(true, Ordering::Release);
        self.sink.stop();
        Ok(())
    }

    fn seek_to(&mut self, position: Duration) -> Result<()> {
        let head = decode_path(&self.path)?.skip_duration(position);
        let tail = if self.looping {
            Some(decode_path(&self.path)?.repeat_infinite())
        } else {
            None
        };

        let was_paused = self.sink.is_paused();
        // `clear` empties the queue and pauses the sink.
        self.sink.clear();
        self.sink.append(head);
        if let Some(tail) = tail {
            self.sink.append(tail);
        }
        self.offset = position;
        if !was_paused {
            self.sink.play();
        }
        Ok(())
    }

    fn position(&self) -> Duration {
        voice_position(self.offset, self.sink.get_pos(), self.looping, self.sink.len())
    }

    fn set_volume(&mut self, gain: f32) {
        self.sink.set_volume(gain);
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }
}
