//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the player and the source
//! its track was read from.

mod model;

pub use model::*;
