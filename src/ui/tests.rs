use std::collections::HashSet;

use super::*;
use crate::catalog::{Album, Artist, ArtistRef, Notification, Profile};

#[test]
fn mmss_formatting() {
    assert_eq!(format_mmss(Duration::from_secs(0)), "00:00");
    assert_eq!(format_mmss(Duration::from_secs(75)), "01:15");
    assert_eq!(format_mmss(Duration::from_millis(3_599_999)), "59:59");
}

#[test]
fn time_text_follows_configured_fields() {
    let ui = UiSettings::default();
    let text = now_playing_time_text(
        Duration::from_secs(30),
        Some(Duration::from_secs(90)),
        &ui,
    );
    assert_eq!(text.as_deref(), Some("00:30 / 01:30 / -01:00"));

    // Without a known duration only the elapsed field survives.
    let text = now_playing_time_text(Duration::from_secs(30), None, &ui);
    assert_eq!(text.as_deref(), Some("00:30"));

    let ui = UiSettings {
        now_playing_time_fields: Vec::new(),
        ..UiSettings::default()
    };
    assert_eq!(now_playing_time_text(Duration::ZERO, None, &ui), None);
}

#[test]
fn restart_key_is_only_listed_when_ready() {
    assert!(!controls_text(5, false).contains("[R]"));
    assert!(controls_text(5, true).contains("[R] restart to update"));
    assert!(controls_text(7, false).contains("[H/L] scrub -/+7s"));
}

#[test]
fn uppercase_at_marks_matches() {
    assert_eq!(uppercase_at("hello world", &[0, 6]), "Hello World");
}

#[test]
fn status_reports_error_and_volume() {
    let app = App::default();
    let now = NowPlaying {
        track: None,
        transport: TransportState::Idle,
        position: Duration::ZERO,
        duration: None,
        volume: 0.5,
        liked: false,
        error: Some("decode failed"),
    };
    let text = status_text(&app, &now, &UiSettings::default());
    assert!(text.contains("Nothing playing"));
    assert!(text.contains("Vol: 50%"));
    assert!(text.contains("Error: decode failed"));
}

fn profile(admin: bool) -> Profile {
    Profile {
        id: "u1".into(),
        username: Some("ada".into()),
        avatar_url: None,
        banner_url: None,
        is_admin: admin,
    }
}

#[test]
fn header_shows_admin_and_unread_count() {
    let mut app = App::default();
    assert_eq!(header_user(&app), " signed out ");

    app.profile = Some(profile(false));
    app.unread_notifications = Some(0);
    assert_eq!(header_user(&app), " ada ");

    app.profile = Some(profile(true));
    app.unread_notifications = Some(3);
    assert_eq!(header_user(&app), " ada (admin) ✉ 3 ");
}

#[test]
fn artist_details_list_description_and_albums() {
    let mut app = App::default();
    assert_eq!(details_text(&app), None);

    app.view = View::Artist("Bob".into());
    app.artist = Some(Artist {
        id: "a1".into(),
        name: "Bob".into(),
        avatar_url: None,
        description: Some("Plays loud".into()),
    });
    app.artist_albums = vec![Album {
        id: "al1".into(),
        title: "Noise".into(),
        cover_art_url: None,
        artist: ArtistRef::default(),
    }];
    assert_eq!(
        details_text(&app).as_deref(),
        Some("Plays loud • Albums: Noise")
    );
}

#[test]
fn search_details_name_people() {
    let mut app = App::default();
    app.view = View::Search("ad".into());
    assert_eq!(details_text(&app), None);

    app.search_profiles = vec![profile(false)];
    assert_eq!(details_text(&app).as_deref(), Some("Users: ada"));
}

#[test]
fn unread_notifications_are_marked() {
    let items = vec![
        Notification {
            id: "n1".into(),
            title: "Welcome".into(),
            content: Some("hi".into()),
            created_at: None,
        },
        Notification {
            id: "n2".into(),
            title: "Maintenance".into(),
            content: None,
            created_at: None,
        },
    ];
    let read: HashSet<String> = ["n2".to_string()].into_iter().collect();
    let panel = NotificationsPanel::new(items, &read);
    assert_eq!(notifications_text(&panel), "● Welcome: hi\n  Maintenance");
    assert_eq!(
        notifications_text(&NotificationsPanel::default()),
        "No notifications"
    );
}
