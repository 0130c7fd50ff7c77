//! Application model: the player plus where its track came from.

use tracing::{info, warn};

use crate::player::Player;
use crate::track::{TrackError, TrackSource};
use crate::visual::{ContainerId, VisualizationBackend};

/// Name of the region the waveform strip is drawn into.
pub const WAVEFORM_CONTAINER: &str = "waveform";

/// The main application model.
pub struct App<B: VisualizationBackend> {
    pub player: Player<B>,
    pub source: TrackSource,
    /// One-line message for the footer, e.g. the outcome of a reload.
    pub notice: Option<String>,
}

impl<B: VisualizationBackend> App<B> {
    pub fn new(player: Player<B>, source: TrackSource) -> Self {
        Self {
            player,
            source,
            notice: None,
        }
    }

    /// Mount the player into the waveform region.
    pub fn mount(&mut self) {
        self.player.mount(ContainerId::new(WAVEFORM_CONTAINER));
    }

    pub fn unmount(&mut self) {
        self.player.unmount();
    }

    /// Re-read the track source and hand the result to the player. A failed
    /// read keeps the current descriptor.
    pub fn reload_track(&mut self) -> Result<bool, TrackError> {
        let track = self.source.load()?;
        let url_changed = track.audio_url != self.player.track().audio_url;
        self.player.set_track(track);
        Ok(url_changed)
    }

    /// `reload_track`, reporting the outcome in the footer.
    pub fn reload_with_notice(&mut self) {
        self.notice = Some(match self.reload_track() {
            Ok(true) => {
                info!(source = %self.source.label(), "reloaded, new audio");
                "Reloaded: new audio".to_string()
            }
            Ok(false) => "Reloaded".to_string(),
            Err(e) => {
                warn!(error = %e, "reload failed");
                format!("Reload failed: {e}")
            }
        });
    }
}
