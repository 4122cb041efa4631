use std::env;
use std::path::PathBuf;
use std::process::Command;
use std::sync::{Arc, mpsc};

use anyhow::Context;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::RodioSinkFactory;
use crate::backend::BackendClient;
use crate::config;
use crate::mpris::ControlCmd;
use crate::player::PlayerController;
use crate::session::SessionProvider;
use crate::shell;

mod event_loop;
mod logging;
mod mpris_sync;
mod settings;
mod startup;

use event_loop::Exit;

/// Load settings and start logging; shared by every entry point.
pub fn bootstrap() -> config::Settings {
    let (settings, fallback) = settings::load_settings();
    // Logging is best effort; the player works without it.
    match logging::init(&settings.logging) {
        Ok(path) => info!(log = ?path, version = env!("CARGO_PKG_VERSION"), "melodex starting"),
        Err(e) => eprintln!("melodex: logging disabled: {e:#}"),
    }
    if let Some(msg) = fallback {
        warn!("{msg}");
    }
    settings
}

pub fn run(settings: config::Settings) -> anyhow::Result<()> {
    let backend = Arc::new(BackendClient::new(&settings.backend).context("backend settings")?);
    let mut session = SessionProvider::new(backend.on_auth_state_change(), backend.current_session());
    let identities = session.subscribe();

    let mut app = App::default();
    startup::sign_in(&backend, &settings, &mut app);
    startup::load_releases(&backend, &mut app);

    let factory = RodioSinkFactory::new(settings.audio.fetch_timeout()).context("opening audio output")?;
    let mut player = PlayerController::new(factory, backend.clone(), settings.audio.initial_volume);

    let (bridge, host) = shell::bridge();
    let staged_updates = settings.update.manifest_url.clone().map(|url| {
        let dir = settings
            .update
            .staging_dir
            .clone()
            .or_else(|| config::default_state_dir().map(|d| d.join("updates")))
            .unwrap_or_else(|| env::temp_dir().join("melodex-updates"));
        shell::spawn_update_check(url, dir, host.notifier())
    });

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let run_result = {
        let mut svc = event_loop::Services {
            settings: &settings,
            backend: &backend,
            session: &mut session,
            identities: &identities,
            bridge: &bridge,
            host: &host,
            staged_updates: staged_updates.as_ref(),
            mpris: &mpris,
            control_rx: &control_rx,
        };
        let mut state = event_loop::EventLoopState::default();
        event_loop::run(&mut terminal, &mut svc, &mut app, &mut player, &mut state)
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Stop audio before a relaunch so two instances never play at once.
    drop(player);

    // Sessions are not persisted, so revoke the token on the way out.
    if backend.current_session().is_some() {
        if let Err(e) = backend.sign_out() {
            warn!(error = %e, "sign-out failed");
        }
    }

    match run_result? {
        Exit::Quit => {
            info!("bye");
            Ok(())
        }
        Exit::Restart(staged) => relaunch(staged),
    }
}

/// Start a fresh process: the staged update if there is one, else ourselves.
fn relaunch(staged: Option<PathBuf>) -> anyhow::Result<()> {
    let exe = match staged {
        Some(p) => p,
        None => env::current_exe().context("locating current executable")?,
    };
    info!(exe = %exe.display(), "restarting");
    Command::new(&exe)
        .args(env::args_os().skip(1))
        .spawn()
        .with_context(|| format!("launching {}", exe.display()))?;
    Ok(())
}
