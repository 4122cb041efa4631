//! Email/password auth against `/auth/v1`.

use std::sync::mpsc::{self, Receiver};

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::client::{BackendClient, check, error_message};
use super::error::{BackendError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A signed-in session as issued by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: User,
}

/// Auth state changes, delivered to every `on_auth_state_change` receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

impl BackendClient {
    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Register a new account.
    ///
    /// Returns the session when the project signs users in right away, or
    /// `None` when an email confirmation is pending.
    pub fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>> {
        let url = self.auth_url("signup");
        debug!(email, "signing up");
        let response = self
            .request(Method::POST, &url)
            .json(&Credentials { email, password })
            .send()?;

        let response = reject_auth_failure(response)?;
        let body: serde_json::Value = response
            .json()
            .map_err(|e| BackendError::Parse(format!("signup response: {e}")))?;

        match serde_json::from_value::<Session>(body) {
            Ok(session) => {
                self.establish(session.clone());
                Ok(Some(session))
            }
            Err(_) => {
                info!(email, "sign-up pending email confirmation");
                Ok(None)
            }
        }
    }

    pub fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let url = self.auth_url("token");
        debug!(email, "signing in");
        let response = self
            .request(Method::POST, &url)
            .query(&[("grant_type", "password")])
            .json(&Credentials { email, password })
            .send()?;

        let response = reject_auth_failure(response)?;
        let session: Session = response
            .json()
            .map_err(|e| BackendError::Parse(format!("token response: {e}")))?;

        info!(user_id = %session.user.id, "signed in");
        self.establish(session.clone());
        Ok(session)
    }

    /// Drop the local session and revoke it remotely.
    ///
    /// The local session is cleared even when the revoke call fails.
    pub fn sign_out(&self) -> Result<()> {
        let token = self.access_token();
        if let Ok(mut s) = self.session.write() {
            *s = None;
        }

        if let Some(token) = token {
            let url = self.auth_url("logout");
            let sent = self
                .http
                .post(&url)
                .header("apikey", &self.anon_key)
                .bearer_auth(token)
                .send()
                .map_err(BackendError::from)
                .and_then(check);
            if let Err(e) = sent {
                warn!(error = %e, "remote sign-out failed");
            }
        }

        info!("signed out");
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session.read().ok().and_then(|s| s.clone())
    }

    /// Subscribe to sign-in/sign-out events.
    pub fn on_auth_state_change(&self) -> Receiver<AuthEvent> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut l) = self.listeners.lock() {
            l.push(tx);
        }
        rx
    }

    pub(super) fn establish(&self, session: Session) {
        if let Ok(mut s) = self.session.write() {
            *s = Some(session.clone());
        }
        self.emit(AuthEvent::SignedIn(session));
    }

    fn emit(&self, event: AuthEvent) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }
}

/// 400/401/422 from the auth service mean bad credentials, not a server fault.
fn reject_auth_failure(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
    let status = response.status().as_u16();
    if matches!(status, 400 | 401 | 422) {
        let body = response.text().unwrap_or_default();
        let message = error_message(&body);
        warn!(status, %message, "auth rejected");
        return Err(BackendError::AuthFailed(message));
    }
    check(response)
}
