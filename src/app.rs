//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and ties the catalog to the
//! playback controller.

mod model;

pub use model::*;
