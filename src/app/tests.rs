use std::collections::HashSet;
use std::path::PathBuf;

use super::*;
use crate::backend::{ArtistPage, SearchResults};
use crate::catalog::{Artist, ArtistRef, Notification, Track};
use crate::shell::ShellNotice;

fn t(id: &str, title: &str) -> Track {
    Track {
        id: id.into(),
        title: title.into(),
        media_url: format!("https://cdn.example.com/{id}.mp3"),
        cover_art_url: None,
        artist: ArtistRef {
            id: String::new(),
            name: "Someone".into(),
        },
        album: None,
    }
}

#[test]
fn fuzzy_match_simple() {
    let title = "Hello World";
    assert!(App::fuzzy_match_positions(title, "hw").is_some());
    assert!(App::fuzzy_match_positions(title, "ello").is_some());
    assert!(App::fuzzy_match_positions(title, "xyz").is_none());
    assert_eq!(App::fuzzy_match_positions(title, "HW"), Some(vec![0, 6]));
}

#[test]
fn next_prev_wrap_around() {
    let mut app = App::new(vec![t("1", "Alpha"), t("2", "Beta"), t("3", "Gamma")]);

    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.next();
    assert_eq!(app.selected, 1);
}

#[test]
fn navigation_on_empty_list_is_a_no_op() {
    let mut app = App::new(Vec::new());
    app.next();
    app.prev();
    app.select_last();
    assert_eq!(app.selected, 0);
    assert!(app.selected_track().is_none());
}

#[test]
fn first_and_last() {
    let mut app = App::new(vec![t("1", "Alpha"), t("2", "Beta"), t("3", "Gamma")]);
    app.select_last();
    assert_eq!(app.selected_track().map(|t| t.id.as_str()), Some("3"));
    app.select_first();
    assert_eq!(app.selected_track().map(|t| t.id.as_str()), Some("1"));
}

#[test]
fn show_replaces_list_and_resets_selection() {
    let mut app = App::new(vec![t("1", "Alpha"), t("2", "Beta")]);
    app.selected = 1;

    app.show(View::Liked, vec![t("9", "Omega")]);
    assert_eq!(app.view, View::Liked);
    assert_eq!(app.selected, 0);
    assert_eq!(app.tracks.len(), 1);
}

#[test]
fn select_track_id_only_moves_to_listed_tracks() {
    let mut app = App::new(vec![t("1", "Alpha"), t("2", "Beta")]);
    assert!(app.select_track_id("2"));
    assert_eq!(app.selected, 1);
    assert!(!app.select_track_id("nope"));
    assert_eq!(app.selected, 1);
}

#[test]
fn search_query_editing_and_threshold() {
    let mut app = App::default();
    app.enter_search_mode();
    assert!(app.search_mode);

    app.push_search_char(' ');
    app.push_search_char('a');
    assert_eq!(app.search_term(2), None);

    app.push_search_char('b');
    assert_eq!(app.search_term(2), Some("ab"));

    app.pop_search_char();
    assert_eq!(app.search_term(2), None);

    app.exit_search_mode();
    assert!(!app.search_mode);

    app.enter_search_mode();
    assert!(app.search_query.is_empty());
}

#[test]
fn restart_needs_a_staged_update() {
    let mut app = App::default();
    app.note_update(ShellNotice::UpdateDownloaded);
    assert!(!app.restart_ready());

    app.staged_update = Some(PathBuf::from("/tmp/melodex-9.9.9"));
    assert!(app.restart_ready());
}

#[test]
fn view_titles() {
    assert_eq!(View::Releases.title(), " releases ");
    assert_eq!(View::Search("abc".into()).title(), " search: abc ");
    assert_eq!(View::Album("Blue".into()).title(), " album: Blue ");
}

fn artist(id: &str, name: &str) -> Artist {
    Artist {
        id: id.into(),
        name: name.into(),
        avatar_url: None,
        description: Some("Plays loud".into()),
    }
}

fn by(mut track: Track, artist_id: &str) -> Track {
    track.artist.id = artist_id.into();
    track
}

#[test]
fn search_keeps_people_until_the_view_changes() {
    let mut app = App::default();
    app.show_search(
        "bo".into(),
        SearchResults {
            tracks: vec![t("1", "Bolero")],
            artists: vec![artist("a1", "Bob")],
            profiles: Vec::new(),
        },
    );
    assert_eq!(app.view, View::Search("bo".into()));
    assert_eq!(app.search_artists.len(), 1);

    app.show(View::Liked, Vec::new());
    assert!(app.search_artists.is_empty());
}

#[test]
fn artist_comes_from_selection_then_search_results() {
    let mut app = App::default();
    app.show_search(
        "bo".into(),
        SearchResults {
            tracks: vec![by(t("1", "Bolero"), "a7")],
            artists: vec![artist("a1", "Bob")],
            profiles: Vec::new(),
        },
    );
    assert_eq!(app.artist_to_open().as_deref(), Some("a7"));

    // tracks with an unknown artist fall back to the first matched artist
    app.tracks = vec![t("2", "Nameless")];
    assert_eq!(app.artist_to_open().as_deref(), Some("a1"));

    app.show(View::Releases, vec![t("2", "Nameless")]);
    assert_eq!(app.artist_to_open(), None);
}

#[test]
fn artist_view_carries_albums() {
    let mut app = App::default();
    app.show_artist(ArtistPage {
        artist: artist("a1", "Bob"),
        albums: Vec::new(),
        tracks: vec![by(t("1", "Bolero"), "a1")],
    });
    assert_eq!(app.view.title(), " artist: Bob ");
    assert_eq!(app.artist.as_ref().map(|a| a.id.as_str()), Some("a1"));
    assert_eq!(app.tracks.len(), 1);
}

fn note(id: &str) -> Notification {
    Notification {
        id: id.into(),
        title: format!("note {id}"),
        content: None,
        created_at: None,
    }
}

#[test]
fn opening_notifications_clears_the_unread_badge() {
    let mut app = App {
        unread_notifications: Some(2),
        ..App::default()
    };
    let read: HashSet<String> = ["n1".to_string()].into_iter().collect();
    let panel = NotificationsPanel::new(vec![note("n1"), note("n2"), note("n3")], &read);
    assert!(!panel.is_unread("n1"));
    assert!(panel.is_unread("n2"));

    app.open_notifications(panel);
    assert_eq!(app.unread_notifications, Some(0));
    // markers reflect what was unread when the panel opened
    assert!(app.notifications.as_ref().is_some_and(|p| p.is_unread("n3")));

    app.close_notifications();
    assert!(app.notifications.is_none());
}

#[test]
fn signed_out_badge_stays_absent() {
    let mut app = App::default();
    app.open_notifications(NotificationsPanel::default());
    assert_eq!(app.unread_notifications, None);
}
