use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Install the global `tracing` subscriber, writing to the configured file.
///
/// Returns `Ok(false)` without installing anything when no file is set: the
/// terminal belongs to the UI, so there is nowhere else to write. `RUST_LOG`
/// overrides the configured level.
pub fn init(settings: &LoggingSettings) -> Result<bool, Box<dyn std::error::Error>> {
    let Some(path) = settings.file.as_ref() else {
        return Ok(false);
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&settings.level))?;

    let subscriber = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(path = %path.display(), "logging started");
    Ok(true)
}
