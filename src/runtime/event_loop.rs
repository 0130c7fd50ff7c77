use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::App;
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::player::TransportStatus;
use crate::runtime::mpris_sync::{MprisSnapshot, sync_mpris};
use crate::ui;
use crate::visual::VisualizationBackend;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Main terminal event loop: applies handle events, draws, and handles input
/// from the keyboard and MPRIS. Returns `Ok(())` when shutdown is requested.
pub fn run<B: VisualizationBackend>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App<B>,
    mpris: &MprisHandle,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut last_mpris: Option<MprisSnapshot> = None;

    loop {
        app.player.update(Instant::now());
        sync_mpris(mpris, app, &mut last_mpris);

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.visualization))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app) {
                return Ok(());
            }
        }

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, control_tx) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply one control request. Returns `true` when the app should quit.
pub fn handle_control_cmd<B: VisualizationBackend>(cmd: ControlCmd, app: &mut App<B>) -> bool {
    let status = app.player.status();
    let sent = match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play if status != TransportStatus::Playing => app.player.toggle_play_pause(),
        ControlCmd::Pause if status == TransportStatus::Playing => app.player.toggle_play_pause(),
        ControlCmd::PlayPause => app.player.toggle_play_pause(),
        ControlCmd::Play | ControlCmd::Pause => false,
    };
    debug!(?cmd, ?status, sent, "control command");
    false
}

/// Apply one key press. Play/pause goes through the control channel so keys
/// and media buttons share one path. Returns `true` when the app should quit.
pub fn handle_key_event<B: VisualizationBackend>(
    key: KeyEvent,
    app: &mut App<B>,
    control_tx: &mpsc::Sender<ControlCmd>,
) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('s') | KeyCode::Char('f') => app.player.toggle_favorite(),
        KeyCode::Char('r') => app.reload_with_notice(),
        _ => {}
    }
    false
}
