//! Visualization backends.
//!
//! The player only talks to the traits in `types`. `backend` is the rodio
//! implementation used by the binary; `scripted` stands in for it in tests.

mod backend;
mod error;
mod sink;
mod strip;
mod thread;
mod types;

#[cfg(test)]
pub mod scripted;

pub use backend::RodioBackend;
pub use error::VisualError;
pub use types::*;

#[cfg(test)]
mod tests;
