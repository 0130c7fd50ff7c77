use super::error::PlayerError;

/// Where the current handle is in its life.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// No handle, or no container to put one in.
    #[default]
    Uninitialized,
    /// A handle exists and its load request is outstanding.
    Provisioning,
    Ready,
    Failed,
}

impl Lifecycle {
    pub fn controls_enabled(self) -> bool {
        self == Self::Ready
    }
}

/// State derived from handle events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub duration_secs: Option<f64>,
    pub position_secs: f64,
    pub error: Option<PlayerError>,
}

/// Coarse transport status, as media keys and MPRIS see it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum TransportStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl TransportStatus {
    pub fn of(lifecycle: Lifecycle, playback: &PlaybackState) -> Self {
        match lifecycle {
            Lifecycle::Ready if playback.is_playing => Self::Playing,
            Lifecycle::Ready => Self::Paused,
            _ => Self::Stopped,
        }
    }
}
