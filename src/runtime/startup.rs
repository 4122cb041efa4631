use tracing::{info, warn};

use crate::app::{App, View};
use crate::backend::{BackendClient, BackendError};
use crate::config;
use crate::session::Identity;

/// Sign in with the configured credentials, if any. Failures end up in the
/// status line rather than aborting startup.
pub fn sign_in(backend: &BackendClient, settings: &config::Settings, app: &mut App) {
    let Some((email, password)) = settings.auth.credentials() else {
        info!("no credentials configured, browsing signed out");
        return;
    };
    match backend.sign_in_with_password(email, password) {
        Ok(session) => info!(user_id = %session.user.id, "signed in"),
        Err(BackendError::AuthFailed(msg)) => {
            warn!(%msg, "sign-in rejected");
            app.set_status(format!("Sign-in failed: {msg}"));
        }
        Err(e) => {
            warn!(error = %e, "sign-in failed");
            app.set_status(format!("Sign-in failed: {e}"));
        }
    }
}

/// Refetch the latest releases into the list.
pub fn load_releases(backend: &BackendClient, app: &mut App) {
    match backend.fetch_tracks() {
        Ok(tracks) => {
            info!(count = tracks.len(), "releases loaded");
            app.show(View::Releases, tracks);
        }
        Err(e) => {
            warn!(error = %e, "could not load releases");
            app.set_status(format!("Could not load releases: {e}"));
        }
    }
}

/// Fetch the profile for a new identity, or clear it on sign-out.
pub fn load_profile(backend: &BackendClient, identity: Option<&Identity>, app: &mut App) {
    let Some(identity) = identity else {
        app.profile = None;
        if app.view == View::Liked {
            app.show(View::Liked, Vec::new());
        }
        return;
    };
    match backend.fetch_profile(&identity.user_id) {
        Ok(profile) => app.profile = profile,
        Err(e) => {
            warn!(error = %e, "could not load profile");
            app.profile = None;
        }
    }
}
