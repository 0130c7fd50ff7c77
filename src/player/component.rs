use std::time::Instant;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use crate::track::TrackDescriptor;
use crate::visual::{ContainerId, VisualizationBackend};

use super::lifecycle::HandleManager;
use super::state::{Lifecycle, PlaybackState, TransportStatus};

/// The player widget: one track, one handle, one favorite flag.
pub struct Player<B: VisualizationBackend> {
    track: TrackDescriptor,
    manager: HandleManager<B>,
    starred: bool,
}

impl<B: VisualizationBackend> Player<B> {
    pub fn new(track: TrackDescriptor, manager: HandleManager<B>) -> Self {
        Self {
            track,
            manager,
            starred: false,
        }
    }

    pub fn track(&self) -> &TrackDescriptor {
        &self.track
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.manager.lifecycle()
    }

    pub fn playback(&self) -> &PlaybackState {
        self.manager.playback()
    }

    pub fn status(&self) -> TransportStatus {
        TransportStatus::of(self.lifecycle(), self.playback())
    }

    pub fn is_starred(&self) -> bool {
        self.starred
    }

    #[cfg(test)]
    pub fn manager(&self) -> &HandleManager<B> {
        &self.manager
    }

    /// Bind the player to its waveform container.
    pub fn mount(&mut self, container: ContainerId) {
        self.manager.mount(container, &self.track.audio_url);
    }

    pub fn unmount(&mut self) {
        self.manager.unmount();
    }

    /// Show a different descriptor. Only a new `audio_url` touches the handle.
    pub fn set_track(&mut self, track: TrackDescriptor) {
        let url_changed = track.audio_url != self.track.audio_url;
        self.track = track;
        if url_changed {
            self.manager.set_audio_url(&self.track.audio_url);
        }
    }

    /// Returns whether a request reached the handle.
    pub fn toggle_play_pause(&mut self) -> bool {
        self.manager.toggle_play_pause()
    }

    pub fn toggle_favorite(&mut self) {
        self.starred = !self.starred;
    }

    /// Apply pending handle events and enforce the load timeout.
    pub fn update(&mut self, now: Instant) -> usize {
        let applied = self.manager.pump();
        self.manager.check_timeout(now);
        applied
    }

    pub fn render_waveform(&self, area: Rect, buf: &mut Buffer) {
        self.manager.render(area, buf);
    }
}
