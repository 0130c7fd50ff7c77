use std::sync::mpsc;
use std::time::{Duration, Instant};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier};

use super::backend::{HandleCmd, destroy_limit};
use super::strip::{progress_of, render_strip};
use super::thread::{LoadOutcome, spawn_loader, spawn_watched};
use super::*;

fn config() -> VisualizerConfig {
    VisualizerConfig {
        wave_color: Color::Gray,
        progress_color: Color::Red,
        cursor_color: Color::Yellow,
        bar_width: 1,
        bar_gap: 1,
        ..VisualizerConfig::default()
    }
}

#[test]
fn sink_stops_delivering_once_subscription_is_cancelled() {
    let (tx, rx) = mpsc::channel();
    let (sink, sub) = EventSink::new(HandleId(3), tx);

    assert!(sink.emit(VisualEventKind::Ready));
    sub.cancel();
    assert!(!sub.is_active());
    assert!(!sink.emit(VisualEventKind::Play));

    let delivered: Vec<VisualEvent> = rx.try_iter().collect();
    assert_eq!(
        delivered,
        vec![VisualEvent {
            handle: HandleId(3),
            kind: VisualEventKind::Ready
        }]
    );
}

#[test]
fn dropping_subscription_cancels_it() {
    let (tx, rx) = mpsc::channel();
    let (sink, sub) = EventSink::new(HandleId(1), tx);
    drop(sub);
    assert!(!sink.emit(VisualEventKind::Ready));
    assert!(rx.try_recv().is_err());
}

#[test]
fn strip_colors_played_part_and_cursor() {
    let area = Rect::new(0, 0, 10, 2);
    let mut buf = Buffer::empty(area);
    render_strip(Some(0.5), &config(), area, &mut buf);

    // bars on even columns, gaps on odd ones
    assert_eq!(buf[(0, 0)].symbol(), "█");
    assert_eq!(buf[(1, 0)].symbol(), " ");
    assert_eq!(buf[(2, 1)].fg, Color::Red);
    // cursor at column 5, the first unplayed column
    assert_eq!(buf[(5, 0)].fg, Color::Yellow);
    assert_eq!(buf[(5, 1)].symbol(), "▌");
    assert_eq!(buf[(6, 0)].fg, Color::Gray);
    assert_eq!(buf[(8, 1)].fg, Color::Gray);
}

#[test]
fn strip_without_progress_is_dim_and_has_no_cursor() {
    let area = Rect::new(2, 1, 6, 1);
    let mut buf = Buffer::empty(Rect::new(0, 0, 10, 3));
    render_strip(None, &config(), area, &mut buf);

    for x in 2..8u16 {
        let cell = &buf[(x, 1)];
        assert_ne!(cell.symbol(), "▌");
        if (x - 2) % 2 == 0 {
            assert_eq!(cell.fg, Color::Gray);
            assert!(cell.modifier.contains(Modifier::DIM));
        }
    }
    // nothing outside the area
    assert_eq!(buf[(0, 1)].symbol(), " ");
    assert_eq!(buf[(2, 0)].symbol(), " ");
}

#[test]
fn progress_is_clamped_and_needs_a_duration() {
    assert_eq!(progress_of(30.0, Some(120.0)), Some(0.25));
    assert_eq!(progress_of(500.0, Some(120.0)), Some(1.0));
    assert_eq!(progress_of(3.0, Some(0.0)), Some(0.0));
    assert_eq!(progress_of(3.0, None), None);
}

#[test]
fn busy_worker_is_detached_once_the_destroy_limit_passes() {
    let (block_tx, block_rx) = mpsc::channel::<()>();
    let worker = spawn_watched("stuck".to_string(), move || {
        // stands in for a worker wedged in a blocking call
        let _ = block_rx.recv();
    })
    .unwrap();

    let limit = destroy_limit(0);
    let started = Instant::now();
    assert!(!worker.join_within(limit));
    let waited = started.elapsed();
    assert!(waited >= limit);
    assert!(waited < limit + Duration::from_secs(2), "waited {waited:?}");

    drop(block_tx);
}

#[test]
fn exiting_worker_is_joined() {
    let worker = spawn_watched("quick".to_string(), || {}).unwrap();
    assert!(worker.join_within(Duration::from_secs(5)));
}

fn recv_loaded(rx: &mpsc::Receiver<HandleCmd>, within: Duration) -> Option<LoadOutcome> {
    match rx.recv_timeout(within) {
        Ok(HandleCmd::Loaded(outcome)) => Some(outcome),
        _ => None,
    }
}

#[test]
fn loader_reports_a_missing_file_as_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.mp3");
    let (tx, rx) = mpsc::channel();

    spawn_loader(path.clone(), 4, false, tx).unwrap();
    let outcome = recv_loaded(&rx, Duration::from_secs(5)).expect("no outcome");
    assert_eq!(outcome.seq, 4);
    assert_eq!(outcome.path, path);
    assert!(!outcome.resume);
    assert!(matches!(outcome.result, Err(VisualError::Open { .. })));
}

#[test]
fn loader_reports_garbage_as_undecodable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noise.mp3");
    std::fs::write(&path, b"definitely not audio").unwrap();
    let (tx, rx) = mpsc::channel();

    spawn_loader(path, 1, true, tx).unwrap();
    let outcome = recv_loaded(&rx, Duration::from_secs(5)).expect("no outcome");
    assert!(outcome.resume);
    assert!(matches!(outcome.result, Err(VisualError::Decode { .. })));
}

#[cfg(unix)]
#[test]
fn loader_blocked_on_a_fifo_does_not_hold_up_the_caller() {
    let dir = tempfile::tempdir().unwrap();
    let fifo = dir.path().join("stream.mp3");
    let made = std::process::Command::new("mkfifo").arg(&fifo).status();
    if !matches!(made, Ok(status) if status.success()) {
        eprintln!("mkfifo unavailable, skipping");
        return;
    }

    let (tx, rx) = mpsc::channel();
    let started = Instant::now();
    spawn_loader(fifo.clone(), 1, false, tx).unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));

    // opening the FIFO for reading blocks until a writer shows up
    assert!(recv_loaded(&rx, Duration::from_millis(200)).is_none());

    let writer = std::fs::OpenOptions::new().write(true).open(&fifo).unwrap();
    drop(writer);

    let outcome = recv_loaded(&rx, Duration::from_secs(5)).expect("no outcome");
    assert_eq!(outcome.seq, 1);
    assert!(outcome.result.is_err());
}
