//! Current-identity provider.
//!
//! A thin pass-through over the backend's auth events: it remembers the
//! latest session and republishes the identity to every subscriber.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use tracing::{debug, info};

use crate::backend::{AuthEvent, Session};

/// Who is signed in, as the rest of the app sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
}

impl From<&Session> for Identity {
    fn from(s: &Session) -> Self {
        Self {
            user_id: s.user.id.clone(),
            email: s.user.email.clone(),
        }
    }
}

pub struct SessionProvider {
    events: Receiver<AuthEvent>,
    current: Option<Session>,
    subscribers: Vec<Sender<Option<Identity>>>,
}

impl SessionProvider {
    /// Start from `initial` (the session the backend already holds, if any)
    /// and follow `events` from then on.
    pub fn new(events: Receiver<AuthEvent>, initial: Option<Session>) -> Self {
        Self {
            events,
            current: initial,
            subscribers: Vec::new(),
        }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.current.as_ref().map(Identity::from)
    }

    /// Subscribe to identity changes. The current identity is delivered first.
    pub fn subscribe(&mut self) -> Receiver<Option<Identity>> {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(self.identity());
        self.subscribers.push(tx);
        rx
    }

    /// Apply all pending auth events, republishing after each one.
    ///
    /// Returns the number of events applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.apply(event);
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("auth event stream closed");
                    break;
                }
            }
        }
        applied
    }

    fn apply(&mut self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(session) => {
                info!(user_id = %session.user.id, "session started");
                self.current = Some(session);
            }
            AuthEvent::SignedOut => {
                info!("session ended");
                self.current = None;
            }
        }
        self.publish();
    }

    fn publish(&mut self) {
        let identity = self.identity();
        self.subscribers
            .retain(|tx| tx.send(identity.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests;
