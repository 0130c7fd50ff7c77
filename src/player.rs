//! The player component and the lifecycle of its visualization handle.

mod component;
mod error;
mod lifecycle;
mod state;

pub use component::Player;
pub use error::PlayerError;
pub use lifecycle::HandleManager;
pub use state::{Lifecycle, PlaybackState, TransportStatus};
