//! Track presentation surface: the descriptor shown by the player and the
//! places it can be read from (TOML track files, audio tags, the demo track).

mod format;
mod locator;
mod model;
mod source;

pub use format::format_duration;
pub use locator::locator_to_path;
pub use model::TrackDescriptor;
pub use source::{TrackError, TrackSource};

#[cfg(test)]
mod tests;
