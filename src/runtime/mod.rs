use std::env;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::mpris::{self, ControlCmd, MprisHandle};
use crate::player::{HandleManager, Player};
use crate::track::TrackSource;
use crate::visual::RodioBackend;

mod event_loop;
mod logging;
mod mpris_sync;
mod settings;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_problem) = settings::load_settings();
    if let Some(msg) = &settings_problem {
        eprintln!("spindle: {msg}");
    }
    match logging::configure_logging(&settings.logging) {
        Ok(Some(path)) => info!(path = %path.display(), "logging to file"),
        Ok(None) => {}
        Err(e) => eprintln!("spindle: logging disabled: {e}"),
    }
    if let Some(msg) = settings_problem {
        warn!("{msg}");
    }

    let arg = env::args().nth(1);
    let source = TrackSource::from_arg(arg.as_deref())?;
    let track = source.load()?;
    info!(source = %source.label(), audio_url = %track.audio_url, "starting");

    let manager = HandleManager::new(
        RodioBackend::new(settings.audio.fade_out_ms),
        settings::visualizer_config(&settings),
        settings::load_timeout(&settings),
    );
    let mut app = App::new(Player::new(track, manager), source);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = if settings.player.mpris {
        mpris::spawn_mpris(control_tx.clone())
    } else {
        MprisHandle::detached()
    };

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.mount();
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mpris,
        &control_tx,
        &control_rx,
    );
    app.unmount();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("bye");
    run_result
}
