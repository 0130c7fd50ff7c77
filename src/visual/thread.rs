use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use super::backend::{HandleCmd, Transport, TransportHandle};
use super::error::VisualError;
use super::sink::{Decoded, attach, decode};
use super::types::{EventSink, VisualEventKind};

/// A running thread plus a channel that disconnects when it exits, so the
/// owner can wait for it with a limit instead of blocking on `join`.
pub(super) struct WorkerHandle {
    join: JoinHandle<()>,
    done: Receiver<()>,
}

impl WorkerHandle {
    /// Wait up to `limit` for the thread to exit. Returns `false` if it was
    /// still running; it is then left detached.
    pub(super) fn join_within(self, limit: Duration) -> bool {
        match self.done.recv_timeout(limit) {
            Err(RecvTimeoutError::Timeout) => false,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let _ = self.join.join();
                true
            }
        }
    }
}

pub(super) fn spawn_watched<F>(name: String, f: F) -> io::Result<WorkerHandle>
where
    F: FnOnce() + Send + 'static,
{
    let (done_tx, done) = mpsc::channel::<()>();
    let join = thread::Builder::new().name(name).spawn(move || {
        // dropped on return or unwind
        let _done = done_tx;
        f();
    })?;
    Ok(WorkerHandle { join, done })
}

/// Result of a background decode, sent back into the worker's command
/// channel. `seq` tells a current load from one that was superseded.
pub(super) struct LoadOutcome {
    pub(super) seq: u64,
    pub(super) path: PathBuf,
    /// Start playing as soon as the sink is attached.
    pub(super) resume: bool,
    pub(super) result: Result<Decoded, VisualError>,
}

/// Decode `path` on its own thread and post the outcome to `tx`. Opening a
/// file can block indefinitely (FIFOs, stalled mounts); the worker keeps
/// serving commands meanwhile.
pub(super) fn spawn_loader(
    path: PathBuf,
    seq: u64,
    resume: bool,
    tx: Sender<HandleCmd>,
) -> io::Result<()> {
    thread::Builder::new()
        .name("spindle-load".to_string())
        .spawn(move || {
            let result = decode(&path);
            // the worker may be gone already
            let _ = tx.send(HandleCmd::Loaded(LoadOutcome {
                seq,
                path,
                resume,
                result,
            }));
        })?;
    Ok(())
}

/// Start a handle worker. Returns once the worker owns an output stream, or
/// with the reason it could not get one. `loopback` feeds the worker's own
/// command channel and carries load outcomes.
pub(super) fn spawn_worker(
    name: String,
    rx: Receiver<HandleCmd>,
    loopback: Sender<HandleCmd>,
    transport: TransportHandle,
    volume: f32,
    tick: Duration,
) -> Result<WorkerHandle, VisualError> {
    let (init_tx, init_rx) = mpsc::channel::<Result<(), String>>();

    let handle = spawn_watched(name, move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                let _ = init_tx.send(Err(e.to_string()));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the TUI.
        stream.log_on_drop(false);
        let _ = init_tx.send(Ok(()));

        let mut worker = Worker {
            stream: &stream,
            loopback,
            transport,
            volume,
            events: None,
            sink: None,
            path: None,
            load_seq: 0,
            finished: false,
        };
        worker.run(rx, tick);
    })?;

    match init_rx.recv() {
        Ok(Ok(())) => Ok(handle),
        Ok(Err(reason)) => {
            handle.join_within(Duration::from_secs(1));
            Err(VisualError::Output(reason))
        }
        Err(_) => {
            handle.join_within(Duration::from_secs(1));
            Err(VisualError::Disconnected)
        }
    }
}

struct Worker<'a> {
    stream: &'a OutputStream,
    loopback: Sender<HandleCmd>,
    transport: TransportHandle,
    volume: f32,
    events: Option<EventSink>,
    sink: Option<Sink>,
    path: Option<PathBuf>,
    /// Bumped per decode request; outcomes carrying an older value are stale.
    load_seq: u64,
    /// The sink ran dry; the next play request starts from the top.
    finished: bool,
}

impl Worker<'_> {
    fn run(&mut self, rx: Receiver<HandleCmd>, tick: Duration) {
        loop {
            match rx.recv_timeout(tick) {
                Ok(HandleCmd::Subscribe(sink)) => self.events = Some(sink),
                Ok(HandleCmd::Load(path)) => self.load(path),
                Ok(HandleCmd::Loaded(outcome)) => self.on_loaded(outcome),
                Ok(HandleCmd::PlayPause) => self.play_pause(),
                Ok(HandleCmd::Destroy { fade_out_ms }) => {
                    self.shutdown(fade_out_ms);
                    return;
                }
                Err(RecvTimeoutError::Timeout) => self.tick(),
                Err(RecvTimeoutError::Disconnected) => {
                    self.shutdown(0);
                    return;
                }
            }
        }
    }

    fn emit(&self, kind: VisualEventKind) {
        if let Some(events) = &self.events {
            events.emit(kind);
        }
    }

    fn load(&mut self, path: PathBuf) {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.update_transport(|t| *t = Default::default());
        self.path = Some(path.clone());
        self.finished = false;
        self.start_decode(path, false);
    }

    fn start_decode(&mut self, path: PathBuf, resume: bool) {
        self.load_seq += 1;
        debug!(path = %path.display(), seq = self.load_seq, "decoding");
        if let Err(e) = spawn_loader(path, self.load_seq, resume, self.loopback.clone()) {
            let e = VisualError::Worker(e);
            warn!(error = %e, "could not start loader");
            self.emit(VisualEventKind::Error(e.to_string()));
        }
    }

    fn on_loaded(&mut self, outcome: LoadOutcome) {
        if outcome.seq != self.load_seq {
            debug!(path = %outcome.path.display(), seq = outcome.seq, "stale load dropped");
            return;
        }

        let Decoded { source, duration } = match outcome.result {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(error = %e, "track failed to load");
                self.emit(VisualEventKind::Error(e.to_string()));
                return;
            }
        };

        let sink = attach(self.stream, source, self.volume);
        debug!(path = %outcome.path.display(), ?duration, "track loaded");
        if outcome.resume {
            sink.play();
            self.update_transport(|t| {
                t.loaded = true;
                t.duration = duration;
                t.position = Duration::ZERO;
                t.playing = true;
            });
            self.sink = Some(sink);
            self.emit(VisualEventKind::Play);
        } else {
            self.update_transport(|t| {
                t.loaded = true;
                t.duration = duration;
            });
            self.sink = Some(sink);
            self.emit(VisualEventKind::Ready);
        }
    }

    fn play_pause(&mut self) {
        if self.finished {
            self.restart();
            return;
        }

        let Some(sink) = self.sink.as_ref() else {
            debug!("play/pause ignored, nothing loaded");
            return;
        };

        if sink.is_paused() {
            sink.play();
            self.update_transport(|t| t.playing = true);
            self.emit(VisualEventKind::Play);
        } else {
            sink.pause();
            self.update_transport(|t| t.playing = false);
            self.emit(VisualEventKind::Pause);
        }
    }

    /// Reopen a finished track and play it once decoded.
    fn restart(&mut self) {
        let Some(path) = self.path.clone() else {
            return;
        };
        self.finished = false;
        self.sink = None;
        self.update_transport(|t| t.position = Duration::ZERO);
        self.start_decode(path, true);
    }

    fn tick(&mut self) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if sink.is_paused() || self.finished {
            return;
        }

        if sink.empty() {
            self.finished = true;
            self.update_transport(|t| {
                t.playing = false;
                if let Some(d) = t.duration {
                    t.position = d;
                }
            });
            self.emit(VisualEventKind::Finish);
            return;
        }

        let pos = sink.get_pos();
        self.update_transport(|t| t.position = pos);
        self.emit(VisualEventKind::TimeUpdate(pos.as_secs_f64()));
    }

    fn shutdown(&mut self, fade_out_ms: u64) {
        if let Some(sink) = self.sink.take() {
            if !sink.is_paused() {
                fade_out_sink(&sink, self.volume, fade_out_ms);
            }
            sink.stop();
        }
        self.events = None;
        self.update_transport(|t| *t = Default::default());
    }

    fn update_transport(&self, f: impl FnOnce(&mut Transport)) {
        if let Ok(mut t) = self.transport.lock() {
            f(&mut t);
        }
    }
}

fn fade_out_sink(sink: &Sink, volume: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(volume * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
