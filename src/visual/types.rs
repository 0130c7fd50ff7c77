//! Backend contract for visualization handles and the events they emit.
//!
//! A backend creates handles; each handle is bound to one container region,
//! loads one track at a time and reports back through an [`EventSink`].

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;

use super::error::VisualError;

/// Identifies one handle for the lifetime of its player.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Names the screen region a handle draws into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(pub String);

impl ContainerId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything a backend needs to build a handle.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizerConfig {
    pub wave_color: Color,
    pub progress_color: Color,
    pub cursor_color: Color,
    pub bar_width: u16,
    pub bar_gap: u16,
    pub tick_ms: u64,
    pub volume: f32,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            wave_color: Color::Rgb(0xD1, 0xD5, 0xDB),
            progress_color: Color::Rgb(0xF9, 0x73, 0x16),
            cursor_color: Color::Rgb(0xF9, 0x73, 0x16),
            bar_width: 1,
            bar_gap: 1,
            tick_ms: 200,
            volume: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VisualEventKind {
    /// The track finished loading; `duration()` is now meaningful.
    Ready,
    /// The track could not be fetched or decoded.
    Error(String),
    Play,
    Pause,
    /// Playback position, in seconds.
    TimeUpdate(f64),
    /// Playback reached the end of the track.
    Finish,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualEvent {
    pub handle: HandleId,
    pub kind: VisualEventKind,
}

/// Where a handle delivers its events. Stops delivering once the matching
/// [`Subscription`] is cancelled.
#[derive(Debug, Clone)]
pub struct EventSink {
    handle: HandleId,
    tx: Sender<VisualEvent>,
    active: Arc<AtomicBool>,
}

impl EventSink {
    /// Create a sink for `handle` feeding `tx`, and the subscription that
    /// controls it.
    pub fn new(handle: HandleId, tx: Sender<VisualEvent>) -> (Self, Subscription) {
        let active = Arc::new(AtomicBool::new(true));
        let sink = Self {
            handle,
            tx,
            active: active.clone(),
        };
        (sink, Subscription { active })
    }

    /// Deliver an event. Returns false when the subscription is gone.
    pub fn emit(&self, kind: VisualEventKind) -> bool {
        if !self.active.load(Ordering::Acquire) {
            return false;
        }
        self.tx
            .send(VisualEvent {
                handle: self.handle,
                kind,
            })
            .is_ok()
    }
}

/// Keeps an [`EventSink`] delivering. Cancelled explicitly or on drop.
#[derive(Debug)]
pub struct Subscription {
    active: Arc<AtomicBool>,
}

impl Subscription {
    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn cancel(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Builds visualization handles.
pub trait VisualizationBackend {
    type Handle: VisualizationHandle;

    /// Create a handle bound to `container`. Fails synchronously when the
    /// handle cannot be constructed at all.
    fn create(
        &mut self,
        config: &VisualizerConfig,
        container: &ContainerId,
    ) -> Result<Self::Handle, VisualError>;
}

/// One live visualization of one track.
pub trait VisualizationHandle {
    /// Route this handle's events into `sink`.
    fn subscribe(&mut self, sink: EventSink);

    /// Request loading `url`. Returns once the request is issued; the outcome
    /// arrives later as `Ready` or `Error`.
    fn load(&mut self, url: &str) -> Result<(), VisualError>;

    /// Ask the handle to flip between playing and paused. The new state is
    /// reported through `Play`/`Pause` events.
    fn play_pause(&mut self);

    /// Track duration in seconds, once loaded.
    fn duration(&self) -> Option<f64>;

    /// Release everything the handle holds. Safe to call mid-load and more
    /// than once.
    fn destroy(&mut self);

    /// Draw the visualization into its container's current area.
    fn render(&self, area: Rect, buf: &mut Buffer);
}
