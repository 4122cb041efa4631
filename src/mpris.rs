use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::warn;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::catalog::Track;
use crate::player::TransportState;

/// Requests arriving from media keys / `playerctl`.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    /// Relative seek in microseconds.
    Seek(i64),
    SetVolume(f64),
}

#[derive(Debug, Default)]
struct SharedState {
    playback: TransportState,
    title: Option<String>,
    artist: Vec<String>,
    album: Option<String>,
    art_url: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<OwnedObjectPath>,
    volume: f64,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: TransportState) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback;
        }
    }

    pub fn set_volume(&self, volume: f32) {
        if let Ok(mut s) = self.state.lock() {
            s.volume = f64::from(volume);
        }
    }

    /// Publish metadata for the track at queue position `index`, or clear it.
    pub fn set_track_metadata(
        &self,
        index: Option<usize>,
        track: Option<&Track>,
        length: Option<Duration>,
    ) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };
        match (index, track) {
            (Some(i), Some(t)) => {
                s.title = Some(t.title.clone());
                s.artist = if t.artist.name.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![t.artist.name.clone()]
                };
                s.album = t.album_title().map(str::to_string);
                s.art_url = t.artwork_url().map(str::to_string);
                s.url = Some(t.media_url.clone());
                s.length_micros = length.map(|d| d.as_micros() as i64);
                s.track_id = ObjectPath::try_from(format!("/org/mpris/MediaPlayer2/track/{i}"))
                    .ok()
                    .map(OwnedObjectPath::from);
            }
            _ => {
                s.title = None;
                s.artist.clear();
                s.album = None;
                s.art_url = None;
                s.url = None;
                s.length_micros = None;
                s.track_id = None;
            }
        }
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

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
        "melodex"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
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
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    fn seek(&self, offset: i64) {
        let _ = self.tx.send(ControlCmd::Seek(offset));
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            TransportState::Idle => "Stopped",
            TransportState::Playing => "Playing",
            TransportState::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        self.state.lock().map(|s| s.volume).unwrap_or(0.0)
    }

    #[zbus(property)]
    fn set_volume(&mut self, value: f64) {
        let _ = self.tx.send(ControlCmd::SetVolume(value));
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
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
        put("xesam:title", Value::from(s.title.clone().unwrap_or_default()));
        if !s.artist.is_empty() {
            put("xesam:artist", Value::from(s.artist.clone()));
        }
        if let Some(album) = &s.album {
            put("xesam:album", Value::from(album.clone()));
        }
        if let Some(art) = &s.art_url {
            put("mpris:artUrl", Value::from(art.clone()));
        }
        if let Some(url) = &s.url {
            put("xesam:url", Value::from(url.clone()));
        }
        if let Some(len) = s.length_micros {
            put("mpris:length", Value::from(len));
        }
        map
    }
}

pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState {
        volume: 1.0,
        ..SharedState::default()
    }));

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let path = "/org/mpris/MediaPlayer2";

            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, "MPRIS: failed to connect to session bus");
                    return;
                }
            };

            if let Err(e) = connection
                .request_name("org.mpris.MediaPlayer2.melodex")
                .await
            {
                warn!(error = %e, "MPRIS: failed to acquire name");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server.at(path, RootIface { tx: tx.clone() }).await {
                warn!(error = %e, "MPRIS: failed to register root iface");
                return;
            }

            if let Err(e) = object_server
                .at(
                    path,
                    PlayerIface {
                        tx,
                        state: state_for_thread,
                    },
                )
                .await
            {
                warn!(error = %e, "MPRIS: failed to register player iface");
                return;
            }

            // Keep the service alive.
            loop {
                Timer::after(std::time::Duration::from_secs(3600)).await;
            }
        });
    });

    MprisHandle { state }
}
