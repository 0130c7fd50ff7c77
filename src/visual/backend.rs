//! The shipped backend: every handle is a worker thread driving a `rodio`
//! sink, and draws its transport position as a bar strip.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use tracing::{debug, warn};

use crate::track::locator_to_path;

use super::error::VisualError;
use super::strip::{progress_of, render_strip};
use super::thread::{LoadOutcome, WorkerHandle, spawn_worker};
use super::types::{
    ContainerId, EventSink, VisualizationBackend, VisualizationHandle, VisualizerConfig,
};

pub(super) enum HandleCmd {
    Subscribe(EventSink),
    Load(PathBuf),
    Loaded(LoadOutcome),
    PlayPause,
    Destroy { fade_out_ms: u64 },
}

/// Transport state published by a worker for rendering and `duration()`.
#[derive(Debug, Clone, Default)]
pub struct Transport {
    pub loaded: bool,
    pub duration: Option<Duration>,
    pub position: Duration,
    pub playing: bool,
}

pub type TransportHandle = Arc<Mutex<Transport>>;

static WORKER_SEQ: AtomicU64 = AtomicU64::new(0);

/// Extra time a worker gets past its fade-out to exit before `destroy`
/// stops waiting for it.
const DESTROY_GRACE: Duration = Duration::from_millis(500);

pub struct RodioBackend {
    fade_out_ms: u64,
}

impl RodioBackend {
    /// `fade_out_ms` is applied when a playing handle is destroyed.
    pub fn new(fade_out_ms: u64) -> Self {
        Self { fade_out_ms }
    }
}

impl VisualizationBackend for RodioBackend {
    type Handle = RodioHandle;

    fn create(
        &mut self,
        config: &VisualizerConfig,
        container: &ContainerId,
    ) -> Result<RodioHandle, VisualError> {
        let (tx, rx) = mpsc::channel::<HandleCmd>();
        let transport: TransportHandle = Arc::new(Mutex::new(Transport::default()));
        let name = format!(
            "spindle-{container}-{}",
            WORKER_SEQ.fetch_add(1, Ordering::Relaxed)
        );

        let worker = spawn_worker(
            name,
            rx,
            tx.clone(),
            transport.clone(),
            config.volume,
            Duration::from_millis(config.tick_ms.max(1)),
        )?;

        Ok(RodioHandle {
            container: container.clone(),
            config: config.clone(),
            tx,
            transport,
            worker: Some(worker),
            fade_out_ms: self.fade_out_ms,
        })
    }
}

pub struct RodioHandle {
    container: ContainerId,
    config: VisualizerConfig,
    tx: Sender<HandleCmd>,
    transport: TransportHandle,
    worker: Option<WorkerHandle>,
    fade_out_ms: u64,
}

impl RodioHandle {
    pub fn transport(&self) -> Transport {
        self.transport
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }
}

impl VisualizationHandle for RodioHandle {
    fn subscribe(&mut self, sink: EventSink) {
        let _ = self.tx.send(HandleCmd::Subscribe(sink));
    }

    fn load(&mut self, url: &str) -> Result<(), VisualError> {
        if url.trim().is_empty() {
            return Err(VisualError::EmptyLocator);
        }
        self.tx
            .send(HandleCmd::Load(locator_to_path(url)))
            .map_err(|_| VisualError::Disconnected)
    }

    fn play_pause(&mut self) {
        let _ = self.tx.send(HandleCmd::PlayPause);
    }

    fn duration(&self) -> Option<f64> {
        self.transport().duration.map(|d| d.as_secs_f64())
    }

    fn destroy(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = self.tx.send(HandleCmd::Destroy {
            fade_out_ms: self.fade_out_ms,
        });
        // Waiting closes this handle's output stream before the next one
        // opens. A worker that overruns is left behind; its subscription is
        // already revoked, so nothing it does later is observed.
        let limit = destroy_limit(self.fade_out_ms);
        if worker.join_within(limit) {
            debug!(container = %self.container, "worker stopped");
        } else {
            warn!(container = %self.container, ?limit, "worker still busy, detached");
        }
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let t = self.transport();
        let progress = if t.loaded {
            progress_of(
                t.position.as_secs_f64(),
                t.duration.map(|d| d.as_secs_f64()),
            )
            .or(Some(0.0))
        } else {
            None
        };
        render_strip(progress, &self.config, area, buf);
    }
}

impl Drop for RodioHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}

pub(super) fn destroy_limit(fade_out_ms: u64) -> Duration {
    Duration::from_millis(fade_out_ms) + DESTROY_GRACE
}
