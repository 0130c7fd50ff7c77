//! Ownership of the player's single visualization handle.
//!
//! `HandleManager` creates a handle when a container and a locator are both
//! known, destroys it before creating its replacement, and turns the handle's
//! events into [`PlaybackState`]. Events travel through one queue tagged with
//! the emitting handle's id; anything not from the live handle is dropped.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use tracing::{debug, info, trace, warn};

use crate::visual::{
    ContainerId, EventSink, HandleId, Subscription, VisualEvent, VisualEventKind,
    VisualizationBackend, VisualizationHandle, VisualizerConfig,
};

use super::error::PlayerError;
use super::state::{Lifecycle, PlaybackState};

struct LiveHandle<H> {
    id: HandleId,
    handle: H,
    subscription: Subscription,
}

pub struct HandleManager<B: VisualizationBackend> {
    backend: B,
    config: VisualizerConfig,
    load_timeout: Option<Duration>,

    container: Option<ContainerId>,
    audio_url: Option<String>,
    live: Option<LiveHandle<B::Handle>>,

    lifecycle: Lifecycle,
    playback: PlaybackState,
    provisioning_since: Option<Instant>,
    next_id: u64,

    tx: Sender<VisualEvent>,
    rx: Receiver<VisualEvent>,
}

impl<B: VisualizationBackend> HandleManager<B> {
    /// `load_timeout` of `None` waits for a load indefinitely.
    pub fn new(backend: B, config: VisualizerConfig, load_timeout: Option<Duration>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            backend,
            config,
            load_timeout,
            container: None,
            audio_url: None,
            live: None,
            lifecycle: Lifecycle::Uninitialized,
            playback: PlaybackState::default(),
            provisioning_since: None,
            next_id: 0,
            tx,
            rx,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    #[cfg(test)]
    pub fn live_handle_id(&self) -> Option<HandleId> {
        self.live.as_ref().map(|l| l.id)
    }

    /// The container became available. Provisions a handle when a locator
    /// is known.
    pub fn mount(&mut self, container: ContainerId, audio_url: &str) {
        if self.container.as_ref() == Some(&container)
            && self.audio_url.as_deref() == Some(audio_url)
        {
            return;
        }
        debug!(%container, "mounted");
        self.container = Some(container);
        self.audio_url = Some(audio_url.to_string());
        self.provision();
    }

    /// The locator changed. Re-provisions when it differs from the current one.
    pub fn set_audio_url(&mut self, audio_url: &str) {
        if self.audio_url.as_deref() == Some(audio_url) {
            return;
        }
        self.audio_url = Some(audio_url.to_string());
        if self.container.is_some() {
            self.provision();
        }
    }

    /// The container went away. Destroys the handle; nothing it emits
    /// afterwards is observed.
    pub fn unmount(&mut self) {
        self.release();
        self.drain_stale();
        if let Some(container) = self.container.take() {
            debug!(%container, "unmounted");
        }
        self.lifecycle = Lifecycle::Uninitialized;
        self.playback.is_playing = false;
        self.provisioning_since = None;
    }

    /// Ask the live handle to flip play state. Returns whether a request was
    /// made; the state itself changes when the handle reports back.
    pub fn toggle_play_pause(&mut self) -> bool {
        if matches!(self.lifecycle, Lifecycle::Failed | Lifecycle::Uninitialized) {
            return false;
        }
        let Some(live) = self.live.as_mut() else {
            return false;
        };
        live.handle.play_pause();
        true
    }

    /// Apply every queued event. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            if self.apply(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Fail a load that has been outstanding for longer than the timeout.
    pub fn check_timeout(&mut self, now: Instant) {
        let (Some(timeout), Some(since)) = (self.load_timeout, self.provisioning_since) else {
            return;
        };
        if self.lifecycle != Lifecycle::Provisioning {
            return;
        }
        if now.saturating_duration_since(since) >= timeout {
            warn!(url = ?self.audio_url, ?timeout, "load timed out");
            // The handle's late Ready must not revive this attempt.
            self.release();
            self.drain_stale();
            self.fail(PlayerError::Timeout(timeout));
        }
    }

    /// Let the live handle draw into `area`.
    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        if let Some(live) = &self.live {
            live.handle.render(area, buf);
        }
    }

    /// Destroy whatever handle exists, then build one for the current locator.
    fn provision(&mut self) {
        self.release();
        self.drain_stale();

        self.playback = PlaybackState::default();
        self.provisioning_since = None;

        let (Some(container), Some(url)) = (self.container.clone(), self.audio_url.clone()) else {
            self.lifecycle = Lifecycle::Uninitialized;
            return;
        };
        if url.trim().is_empty() {
            self.lifecycle = Lifecycle::Uninitialized;
            return;
        }

        self.lifecycle = Lifecycle::Provisioning;
        let id = HandleId(self.next_id);
        self.next_id += 1;

        let mut handle = match self.backend.create(&self.config, &container) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(%container, error = %e, "could not create handle");
                self.fail(PlayerError::Initialization(e.to_string()));
                return;
            }
        };

        let (sink, subscription) = EventSink::new(id, self.tx.clone());
        handle.subscribe(sink);

        if let Err(e) = handle.load(&url) {
            warn!(handle = %id, %url, error = %e, "load request rejected");
            subscription.cancel();
            handle.destroy();
            self.fail(PlayerError::Initialization(e.to_string()));
            return;
        }

        info!(handle = %id, %container, %url, "handle provisioned");
        self.provisioning_since = Some(Instant::now());
        self.live = Some(LiveHandle {
            id,
            handle,
            subscription,
        });
    }

    /// Unsubscribe and destroy the live handle, if any.
    fn release(&mut self) {
        if let Some(mut live) = self.live.take() {
            live.subscription.cancel();
            live.handle.destroy();
            debug!(handle = %live.id, "handle destroyed");
        }
    }

    /// Discard events a released handle queued before it was unsubscribed.
    fn drain_stale(&mut self) {
        debug_assert!(self.live.is_none());
        for event in self.rx.try_iter() {
            trace!(handle = %event.handle, kind = ?event.kind, "stale event dropped");
        }
    }

    fn fail(&mut self, error: PlayerError) {
        self.lifecycle = Lifecycle::Failed;
        self.playback.is_playing = false;
        self.playback.error = Some(error);
        self.provisioning_since = None;
    }

    fn apply(&mut self, event: VisualEvent) -> bool {
        let Some(live) = self.live.as_ref().filter(|l| l.id == event.handle) else {
            trace!(handle = %event.handle, kind = ?event.kind, "stale event dropped");
            return false;
        };

        match event.kind {
            VisualEventKind::Ready => {
                if !matches!(self.lifecycle, Lifecycle::Provisioning | Lifecycle::Ready) {
                    return false;
                }
                let duration = live.handle.duration();
                info!(handle = %live.id, ?duration, "handle ready");
                self.lifecycle = Lifecycle::Ready;
                self.playback.error = None;
                self.playback.duration_secs = duration;
                self.provisioning_since = None;
            }
            VisualEventKind::Error(reason) => {
                warn!(handle = %live.id, %reason, "handle reported an error");
                self.fail(PlayerError::Load(reason));
            }
            VisualEventKind::Play => return self.set_playing(true),
            VisualEventKind::Pause | VisualEventKind::Finish => return self.set_playing(false),
            VisualEventKind::TimeUpdate(position) => {
                if self.lifecycle != Lifecycle::Ready {
                    return false;
                }
                self.playback.position_secs = position;
            }
        }
        true
    }

    fn set_playing(&mut self, playing: bool) -> bool {
        if self.lifecycle != Lifecycle::Ready {
            return false;
        }
        self.playback.is_playing = playing;
        true
    }
}

impl<B: VisualizationBackend> Drop for HandleManager<B> {
    fn drop(&mut self) {
        self.release();
    }
}
