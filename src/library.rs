//! Media index: turns a music directory into an ordered list of [`Track`]s.

mod model;
mod scan;

pub use model::*;
pub use scan::scan;
