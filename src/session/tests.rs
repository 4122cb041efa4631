use std::sync::mpsc;

use super::*;
use crate::backend::User;

fn session(user_id: &str) -> Session {
    Session {
        access_token: "jwt".into(),
        refresh_token: None,
        user: User {
            id: user_id.into(),
            email: None,
        },
    }
}

#[test]
fn subscribe_delivers_current_identity_first() {
    let (_tx, rx) = mpsc::channel();
    let mut provider = SessionProvider::new(rx, Some(session("u1")));
    let sub = provider.subscribe();
    assert_eq!(sub.try_recv().unwrap().unwrap().user_id, "u1");
    assert!(sub.try_recv().is_err());
}

#[test]
fn every_event_is_republished_to_every_subscriber() {
    let (tx, rx) = mpsc::channel();
    let mut provider = SessionProvider::new(rx, None);
    let a = provider.subscribe();
    let b = provider.subscribe();
    assert_eq!(a.try_recv().unwrap(), None);
    assert_eq!(b.try_recv().unwrap(), None);

    tx.send(AuthEvent::SignedIn(session("u1"))).unwrap();
    tx.send(AuthEvent::SignedOut).unwrap();
    assert_eq!(provider.pump(), 2);

    for sub in [&a, &b] {
        assert_eq!(sub.try_recv().unwrap().unwrap().user_id, "u1");
        assert_eq!(sub.try_recv().unwrap(), None);
    }
    assert!(provider.identity().is_none());
}

#[test]
fn pump_survives_closed_stream_and_dropped_subscribers() {
    let (tx, rx) = mpsc::channel();
    let mut provider = SessionProvider::new(rx, None);
    drop(provider.subscribe());
    let live = provider.subscribe();

    tx.send(AuthEvent::SignedIn(session("u2"))).unwrap();
    drop(tx);

    assert_eq!(provider.pump(), 1);
    assert_eq!(provider.pump(), 0);
    assert_eq!(provider.subscribers.len(), 1);
    assert_eq!(live.try_iter().last().unwrap().unwrap().user_id, "u2");
    assert_eq!(provider.identity().unwrap().user_id, "u2");
}
