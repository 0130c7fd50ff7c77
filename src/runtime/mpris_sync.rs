use crate::app::App;
use crate::mpris::MprisHandle;
use crate::player::{Lifecycle, TransportStatus};
use crate::track::TrackDescriptor;
use crate::visual::VisualizationBackend;

/// What MPRIS last saw, so the loop only publishes changes.
#[derive(Debug, Clone, PartialEq)]
pub struct MprisSnapshot {
    pub status: TransportStatus,
    pub lifecycle: Lifecycle,
    pub track: TrackDescriptor,
    pub duration_secs: Option<f64>,
}

impl MprisSnapshot {
    pub fn of<B: VisualizationBackend>(app: &App<B>) -> Self {
        let player = &app.player;
        Self {
            status: player.status(),
            lifecycle: player.lifecycle(),
            track: player.track().clone(),
            duration_secs: player.playback().duration_secs,
        }
    }
}

pub fn update_mpris<B: VisualizationBackend>(mpris: &MprisHandle, app: &App<B>) {
    let player = &app.player;
    mpris.set_track_metadata(Some(player.track()), player.playback().duration_secs);
    mpris.set_status(player.status(), player.lifecycle().controls_enabled());
}

/// Publish to MPRIS if anything it shows changed since `last`. `None`
/// always publishes.
pub fn sync_mpris<B: VisualizationBackend>(
    mpris: &MprisHandle,
    app: &App<B>,
    last: &mut Option<MprisSnapshot>,
) -> bool {
    let now = MprisSnapshot::of(app);
    if last.as_ref() == Some(&now) {
        return false;
    }
    update_mpris(mpris, app);
    *last = Some(now);
    true
}
