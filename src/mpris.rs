use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use async_io::block_on;
use tracing::{debug, info, warn};
use zbus::object_server::InterfaceRef;
use zbus::{Connection, interface};
use zvariant::{OwnedObjectPath, OwnedValue, Value};

use crate::player::TransportStatus;
use crate::track::TrackDescriptor;

const BUS_NAME: &str = "org.mpris.MediaPlayer2.spindle";
const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const TRACK_ID: &str = "/org/mpris/MediaPlayer2/track/current";

/// Requests coming from the session bus, handled on the UI thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
}

#[derive(Debug, Default)]
struct SharedState {
    status: TransportStatus,
    controls_enabled: bool,
    title: Option<String>,
    artist: Vec<String>,
    genre: Vec<String>,
    url: Option<String>,
    art_url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<OwnedObjectPath>,
}

/// Writer side of the MPRIS state. Every setter wakes the service thread so
/// it can emit `PropertiesChanged`.
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

impl MprisHandle {
    /// A handle with no service behind it, used when MPRIS is turned off.
    pub fn detached() -> Self {
        let (notify, _) = mpsc::channel();
        Self {
            state: Arc::new(Mutex::new(SharedState::default())),
            notify,
        }
    }

    pub fn set_status(&self, status: TransportStatus, controls_enabled: bool) {
        if let Ok(mut s) = self.state.lock() {
            s.status = status;
            s.controls_enabled = controls_enabled;
        }
        let _ = self.notify.send(());
    }

    pub fn set_track_metadata(
        &self,
        track: Option<&TrackDescriptor>,
        duration_secs: Option<f64>,
    ) {
        if let Ok(mut s) = self.state.lock() {
            match track {
                Some(track) => {
                    s.title = Some(track.title.clone());
                    s.artist = non_empty(&track.artist);
                    s.genre = non_empty(&track.genre);
                    s.url = Some(to_uri(&track.audio_url)).filter(|u| !u.is_empty());
                    s.art_url = Some(to_uri(&track.album_art_url)).filter(|u| !u.is_empty());
                    s.length_micros = duration_secs
                        .filter(|d| d.is_finite() && *d >= 0.0)
                        .map(|d| (d * 1_000_000.0) as i64);
                    s.track_id = OwnedObjectPath::try_from(TRACK_ID).ok();
                }
                None => {
                    s.title = None;
                    s.artist.clear();
                    s.genre.clear();
                    s.url = None;
                    s.art_url = None;
                    s.length_micros = None;
                    s.track_id = None;
                }
            }
        }
        let _ = self.notify.send(());
    }
}

fn non_empty(value: &str) -> Vec<String> {
    let value = value.trim();
    if value.is_empty() {
        Vec::new()
    } else {
        vec![value.to_string()]
    }
}

/// Local paths become `file://` URIs; anything with a scheme is kept.
fn to_uri(locator: &str) -> String {
    let locator = locator.trim();
    if locator.is_empty() || locator.contains("://") {
        locator.to_string()
    } else if locator.starts_with('/') {
        format!("file://{locator}")
    } else {
        match std::env::current_dir() {
            Ok(cwd) => format!("file://{}", cwd.join(locator).display()),
            Err(_) => locator.to_string(),
        }
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {}

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "spindle"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {}

    fn previous(&self) {}

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    /// A single track has nowhere to stop to; treat it as pause.
    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.status {
            TransportStatus::Stopped => "Stopped",
            TransportStatus::Playing => "Playing",
            TransportStatus::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        self.state.lock().map(|s| s.controls_enabled).unwrap_or(false)
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        self.state.lock().map(|s| s.controls_enabled).unwrap_or(false)
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let mut put = |key: &str, value: Value<'_>| {
            if let Ok(v) = OwnedValue::try_from(value) {
                map.insert(key.to_string(), v);
            }
        };

        if let Some(id) = &s.track_id {
            put("mpris:trackid", Value::from(id.clone().into_inner()));
        }
        if let Some(title) = &s.title {
            put("xesam:title", Value::from(title.clone()));
        }
        if !s.artist.is_empty() {
            put("xesam:artist", Value::from(s.artist.clone()));
        }
        if !s.genre.is_empty() {
            put("xesam:genre", Value::from(s.genre.clone()));
        }
        if let Some(url) = &s.url {
            put("xesam:url", Value::from(url.clone()));
        }
        if let Some(art) = &s.art_url {
            put("mpris:artUrl", Value::from(art.clone()));
        }
        if let Some(len) = s.length_micros {
            put("mpris:length", Value::from(len));
        }
        map
    }
}

async fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
) -> zbus::Result<(Connection, InterfaceRef<PlayerIface>)> {
    let connection = Connection::session().await?;
    let server = connection.object_server();
    server.at(OBJECT_PATH, RootIface { tx: tx.clone() }).await?;
    server.at(OBJECT_PATH, PlayerIface { tx, state }).await?;
    connection.request_name(BUS_NAME).await?;
    let iface = server.interface::<_, PlayerIface>(OBJECT_PATH).await?;
    Ok((connection, iface))
}

async fn announce(iface: &InterfaceRef<PlayerIface>) -> zbus::Result<()> {
    let emitter = iface.signal_emitter();
    let player = iface.get().await;
    player.playback_status_changed(emitter).await?;
    player.metadata_changed(emitter).await?;
    player.can_play_changed(emitter).await?;
    player.can_pause_changed(emitter).await?;
    Ok(())
}

fn run_service(tx: Sender<ControlCmd>, state: Arc<Mutex<SharedState>>, notify: Receiver<()>) {
    let (_connection, iface) = match block_on(serve(tx, state)) {
        Ok(served) => served,
        Err(e) => {
            warn!(error = %e, "MPRIS unavailable");
            return;
        }
    };
    info!(name = BUS_NAME, "MPRIS service registered");

    // Ends when the handle is dropped.
    while notify.recv().is_ok() {
        while notify.try_recv().is_ok() {}
        if let Err(e) = block_on(announce(&iface)) {
            debug!(error = %e, "failed to emit MPRIS property changes");
        }
    }
}

/// Serve `org.mpris.MediaPlayer2` on the session bus from a background
/// thread. Failures are logged and leave the returned handle inert.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();

    let state_for_thread = state.clone();
    let spawned = thread::Builder::new()
        .name("spindle-mpris".to_string())
        .spawn(move || run_service(tx, state_for_thread, notify_rx));
    if let Err(e) = spawned {
        warn!(error = %e, "failed to start MPRIS thread");
    }

    MprisHandle {
        state,
        notify: notify_tx,
    }
}
