use std::time::Duration;

use thiserror::Error;

/// Why the player cannot play the current track. All variants end up in the
/// same error state; the distinction is kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    /// The handle could not be built or refused the load request.
    #[error("failed to initialize audio player: {0}")]
    Initialization(String),
    /// The handle reported that the track could not be fetched or decoded.
    #[error("failed to load audio: {0}")]
    Load(String),
    #[error("no response after {}ms while loading audio", .0.as_millis())]
    Timeout(Duration),
}

impl PlayerError {
    /// Short text for the error banner.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Initialization(_) => "Failed to initialize audio player",
            Self::Load(_) => "Failed to load audio",
            Self::Timeout(_) => "Timed out loading audio",
        }
    }
}
