use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::{App, NotificationsPanel, View};
use crate::audio::SinkFactory;
use crate::backend::{BackendClient, MIN_SEARCH_LEN, NotificationWatch};
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::player::{PlayerController, TransportState};
use crate::runtime::mpris_sync::{MprisSnapshot, update_mpris};
use crate::runtime::startup;
use crate::session::{Identity, SessionProvider};
use crate::shell::{ShellBridge, ShellCommand, ShellHost};
use crate::ui::{self, NowPlaying};

pub type Player<F> = PlayerController<F, Arc<BackendClient>>;

/// How the loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exit {
    Quit,
    /// Relaunch; `Some` points at a staged update binary.
    Restart(Option<PathBuf>),
}

/// Everything the loop talks to besides the terminal and the view model.
pub struct Services<'a> {
    pub settings: &'a config::Settings,
    pub backend: &'a Arc<BackendClient>,
    pub session: &'a mut SessionProvider,
    pub identities: &'a Receiver<Option<Identity>>,
    pub bridge: &'a ShellBridge,
    pub host: &'a ShellHost,
    pub staged_updates: Option<&'a Receiver<PathBuf>>,
    pub mpris: &'a MprisHandle,
    pub control_rx: &'a Receiver<ControlCmd>,
}

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// What MPRIS was last told.
    pub last_mpris: Option<MprisSnapshot>,
    /// Unread-count refetch for the signed-in user, keyed by user id.
    pub notification_watch: Option<(String, NotificationWatch)>,
}

/// Main terminal event loop: pumps auth, sink and shell events, keeps MPRIS
/// in sync, draws and handles input. Returns once the shell is told to close
/// or restart.
pub fn run<F: SinkFactory>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    svc: &mut Services<'_>,
    app: &mut App,
    player: &mut Player<F>,
    state: &mut EventLoopState,
) -> anyhow::Result<Exit> {
    loop {
        svc.session.pump();
        while let Ok(identity) = svc.identities.try_recv() {
            startup::load_profile(svc.backend, identity.as_ref(), app);
            watch_notifications(svc, state, app, identity.as_ref());
            player.set_identity(identity);
        }
        if let Some((_, watch)) = &state.notification_watch {
            if let Some(n) = watch.latest() {
                app.unread_notifications = Some(n);
            }
        }

        player.pump();

        while let Some(notice) = svc.bridge.try_recv_notice() {
            info!(channel = notice.channel(), "update notice");
            app.note_update(notice);
        }
        if let Some(rx) = svc.staged_updates {
            if let Ok(path) = rx.try_recv() {
                app.staged_update = Some(path);
            }
        }

        while let Some(cmd) = svc.host.try_recv_command() {
            match cmd {
                ShellCommand::CloseWindow => return Ok(Exit::Quit),
                ShellCommand::RestartApp => return Ok(Exit::Restart(app.staged_update.clone())),
                ShellCommand::MinimizeWindow | ShellCommand::MaximizeWindow => {
                    info!(channel = cmd.channel(), "window command has no effect in a terminal");
                }
            }
        }

        // Keep MPRIS in sync even when playback changes come from media keys or auto-advance.
        let snapshot = MprisSnapshot::of(player.state());
        if state.last_mpris.as_ref() != Some(&snapshot) {
            update_mpris(svc.mpris, player.state());
            state.last_mpris = Some(snapshot);
        }

        terminal.draw(|f| {
            let s = player.state();
            let now = NowPlaying {
                track: s.current.as_ref(),
                transport: s.transport(),
                position: s.position,
                duration: s.duration,
                volume: s.volume,
                liked: player.is_current_track_liked(),
                error: player.last_error(),
            };
            ui::draw(f, app, &now, &svc.settings.ui, &svc.settings.controls)
        })?;

        while let Ok(cmd) = svc.control_rx.try_recv() {
            handle_control_cmd(cmd, svc, app, player);
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_key_event(key, svc, app, player, state);
            }
        }
    }
}

/// Follow the signed-in user with a notification watch. Token refreshes
/// republish the same user and keep the running watch.
fn watch_notifications(
    svc: &Services<'_>,
    state: &mut EventLoopState,
    app: &mut App,
    identity: Option<&Identity>,
) {
    let Some(identity) = identity else {
        state.notification_watch = None;
        app.unread_notifications = None;
        app.close_notifications();
        return;
    };
    if state
        .notification_watch
        .as_ref()
        .is_some_and(|(user, _)| *user == identity.user_id)
    {
        return;
    }
    let every = Duration::from_secs(svc.settings.notifications.refresh_secs);
    let watch = NotificationWatch::spawn(svc.backend.clone(), identity.user_id.clone(), every);
    state.notification_watch = Some((identity.user_id.clone(), watch));
    app.unread_notifications = Some(0);
}

fn request_shell(svc: &Services<'_>, cmd: ShellCommand) {
    if let Err(e) = svc.bridge.command(cmd) {
        warn!(error = %e, channel = cmd.channel(), "shell command failed");
    }
}

/// Play the selected track with the visible list as its queue.
fn play_selected<F: SinkFactory>(app: &App, player: &mut Player<F>) {
    if let Some(track) = app.selected_track() {
        player.play_track(track.clone(), Some(app.tracks.clone()));
    }
}

/// Toggle, or start the selection when nothing has been played yet.
fn play_or_toggle<F: SinkFactory>(app: &App, player: &mut Player<F>) {
    if player.transport() == TransportState::Idle {
        play_selected(app, player);
    } else {
        player.toggle_play();
    }
}

fn seek_micros<F: SinkFactory>(player: &mut Player<F>, micros: i64) {
    let cur = player.state().position;
    let step = Duration::from_micros(micros.unsigned_abs());
    let target = if micros < 0 {
        cur.saturating_sub(step)
    } else {
        cur.saturating_add(step)
    };
    player.seek(target);
}

fn handle_control_cmd<F: SinkFactory>(
    cmd: ControlCmd,
    svc: &Services<'_>,
    app: &mut App,
    player: &mut Player<F>,
) {
    match cmd {
        ControlCmd::Quit => request_shell(svc, ShellCommand::CloseWindow),
        ControlCmd::Play => match player.transport() {
            TransportState::Paused => player.toggle_play(),
            TransportState::Idle => play_selected(app, player),
            TransportState::Playing => {}
        },
        ControlCmd::Pause | ControlCmd::Stop => {
            if player.transport() == TransportState::Playing {
                player.toggle_play();
            }
        }
        ControlCmd::PlayPause => play_or_toggle(app, player),
        ControlCmd::Next => player.play_next(),
        ControlCmd::Prev => player.play_prev(),
        ControlCmd::Seek(micros) => seek_micros(player, micros),
        ControlCmd::SetVolume(v) => player.change_volume(v as f32),
    }
}

fn open_search(svc: &Services<'_>, app: &mut App) {
    let Some(term) = app.search_term(MIN_SEARCH_LEN).map(str::to_string) else {
        app.set_status(format!("Type at least {MIN_SEARCH_LEN} characters to search"));
        return;
    };
    app.exit_search_mode();
    match svc.backend.search(&term) {
        Ok(results) => {
            app.clear_status();
            app.show_search(term, results);
        }
        Err(e) => {
            warn!(error = %e, "search failed");
            app.set_status(format!("Search failed: {e}"));
        }
    }
}

/// Show the selected track's album and play from that track.
fn open_album<F: SinkFactory>(svc: &Services<'_>, app: &mut App, player: &mut Player<F>) {
    let Some(track) = app.selected_track().cloned() else {
        return;
    };
    let Some(album_id) = track.album_id().map(str::to_string) else {
        app.set_status("This track has no album");
        return;
    };
    let title = track.album_title().unwrap_or("untitled").to_string();
    match svc.backend.fetch_album_tracks(&album_id) {
        Ok(tracks) => {
            app.show(View::Album(title), tracks);
            app.select_track_id(&track.id);
            player.play_track(track, Some(app.tracks.clone()));
        }
        Err(e) => {
            warn!(error = %e, album_id = %album_id, "could not load album");
            app.set_status(format!("Could not load album: {e}"));
        }
    }
}

fn open_artist(svc: &Services<'_>, app: &mut App) {
    let Some(artist_id) = app.artist_to_open() else {
        app.set_status("No artist to show");
        return;
    };
    match svc.backend.fetch_artist_page(&artist_id) {
        Ok(Some(page)) => {
            app.clear_status();
            app.show_artist(page);
        }
        Ok(None) => app.set_status("Artist not found"),
        Err(e) => {
            warn!(error = %e, artist_id = %artist_id, "could not load artist");
            app.set_status(format!("Could not load artist: {e}"));
        }
    }
}

/// Open the panel and mark what it shows as read; `n` again closes it.
fn toggle_notifications(svc: &Services<'_>, app: &mut App) {
    if app.notifications.is_some() {
        app.close_notifications();
        return;
    }
    let Some(identity) = svc.session.identity() else {
        app.set_status("Sign in to see notifications");
        return;
    };
    let user_id = identity.user_id.clone();
    let loaded = svc.backend.fetch_notifications().and_then(|items| {
        let read = svc.backend.read_notification_ids(&user_id)?;
        Ok(NotificationsPanel::new(items, &read))
    });
    let panel = match loaded {
        Ok(panel) => panel,
        Err(e) => {
            warn!(error = %e, "could not load notifications");
            app.set_status(format!("Could not load notifications: {e}"));
            return;
        }
    };
    let unread: Vec<&str> = panel.unread.iter().map(String::as_str).collect();
    if let Err(e) = svc.backend.mark_notifications_read(&user_id, &unread) {
        warn!(error = %e, "could not mark notifications read");
    }
    app.open_notifications(panel);
}

fn open_liked(svc: &Services<'_>, app: &mut App) {
    let Some(identity) = svc.session.identity() else {
        app.set_status("Sign in to see liked songs");
        return;
    };
    match svc.backend.fetch_liked_tracks(&identity.user_id) {
        Ok(tracks) => app.show(View::Liked, tracks),
        Err(e) => {
            warn!(error = %e, "could not load liked songs");
            app.set_status(format!("Could not load liked songs: {e}"));
        }
    }
}

fn handle_key_event<F: SinkFactory>(
    key: KeyEvent,
    svc: &Services<'_>,
    app: &mut App,
    player: &mut Player<F>,
    state: &mut EventLoopState,
) {
    if app.search_mode {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => app.exit_search_mode(),
            KeyCode::Backspace => app.pop_search_char(),
            KeyCode::Enter => open_search(svc, app),
            KeyCode::Char(c) if !c.is_control() => app.push_search_char(c),
            _ => {}
        }
        return;
    }

    if app.notifications.is_some() && key.code == KeyCode::Esc {
        app.close_notifications();
        return;
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    let scrub = svc.settings.controls.scrub_seconds.min(i64::MAX as u64) as i64;
    let step = svc.settings.audio.volume_step;

    match key.code {
        KeyCode::Char('q') => request_shell(svc, ShellCommand::CloseWindow),
        KeyCode::Char('R') => {
            if app.restart_ready() {
                request_shell(svc, ShellCommand::RestartApp);
            }
        }
        KeyCode::Char('/') => app.enter_search_mode(),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('j') => app.next(),
        KeyCode::Char('k') => app.prev(),
        KeyCode::Enter => {
            let already_playing = player.transport() == TransportState::Playing
                && player
                    .current_track()
                    .zip(app.selected_track())
                    .is_some_and(|(cur, sel)| cur.id == sel.id);
            if !already_playing {
                play_selected(app, player);
            }
        }
        KeyCode::Char('a') => open_album(svc, app, player),
        KeyCode::Char('A') => open_artist(svc, app),
        KeyCode::Char('n') => toggle_notifications(svc, app),
        KeyCode::Char(' ') | KeyCode::Char('p') => play_or_toggle(app, player),
        KeyCode::Char('l') => player.play_next(),
        KeyCode::Char('h') => player.play_prev(),
        KeyCode::Char('L') => player.seek_by(scrub),
        KeyCode::Char('H') => player.seek_by(-scrub),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            player.change_volume(player.state().volume + step)
        }
        KeyCode::Char('-') => player.change_volume(player.state().volume - step),
        KeyCode::Char('f') => {
            if svc.session.identity().is_none() {
                app.set_status("Sign in to like songs");
            } else {
                player.toggle_like();
            }
        }
        KeyCode::Char('F') => open_liked(svc, app),
        KeyCode::Char('r') => {
            app.clear_status();
            player.clear_error();
            startup::load_releases(svc.backend, app);
        }
        _ => {}
    }
}
