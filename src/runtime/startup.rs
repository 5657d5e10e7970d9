use std::path::Path;
use std::sync::mpsc::{self, Receiver};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::app::App;
use crate::audio::{Backend, PlaybackController, PlayerEvent, Wakeup};
use crate::catalog::TrackCatalog;
use crate::config;
use crate::error::Result;
use crate::library::scan;

/// The app plus the two channels the event loop drains.
pub struct Wiring<B: Backend> {
    pub app: App<B>,
    pub events: Receiver<PlayerEvent>,
    pub wakeups: Receiver<Wakeup>,
}

/// Scan `dir` into a catalog. Fails with `EmptyCatalog` when nothing playable
/// was found, before any audio device is touched.
pub fn build_catalog(dir: &Path, settings: &config::Settings) -> Result<TrackCatalog> {
    let catalog = TrackCatalog::new(scan(dir, &settings.library));
    catalog.size()?;
    Ok(catalog)
}

/// Build the controller and app around `backend` and cue a random first track.
pub fn wire<B: Backend>(
    backend: B,
    catalog: TrackCatalog,
    settings: &config::Settings,
    rng: StdRng,
) -> Result<Wiring<B>> {
    let (event_tx, events) = mpsc::channel::<PlayerEvent>();
    let (wake_tx, wakeups) = mpsc::channel::<Wakeup>();

    let player = PlaybackController::new(backend, &settings.audio, event_tx, wake_tx);
    let mut app = App::new(catalog, player, settings, rng);
    app.start()?;

    Ok(Wiring {
        app,
        events,
        wakeups,
    })
}

pub fn os_rng() -> StdRng {
    StdRng::from_os_rng()
}
