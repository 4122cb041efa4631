//! View model types: `App` and `View`.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::backend::{ArtistPage, SearchResults};
use crate::catalog::{Album, Artist, Notification, Profile, Track};
use crate::shell::ShellNotice;

/// Which list the track pane shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum View {
    /// Latest releases, newest first.
    #[default]
    Releases,
    /// Results for a search term.
    Search(String),
    /// Tracks of one album, by title.
    Album(String),
    /// Tracks of one artist, by name.
    Artist(String),
    /// The signed-in user's liked songs.
    Liked,
}

impl View {
    pub fn title(&self) -> String {
        match self {
            View::Releases => " releases ".to_string(),
            View::Search(q) => format!(" search: {q} "),
            View::Album(t) => format!(" album: {t} "),
            View::Artist(name) => format!(" artist: {name} "),
            View::Liked => " liked songs ".to_string(),
        }
    }
}

/// The main view model.
#[derive(Default)]
pub struct App {
    pub tracks: Vec<Track>,
    pub selected: usize,
    pub view: View,

    pub search_mode: bool,
    pub search_query: String,

    /// One-line message shown in the status box (fetch results, auth errors).
    pub status: Option<String>,
    pub profile: Option<Profile>,

    /// Latest update notice from the shell.
    pub update: Option<ShellNotice>,
    /// Path of a downloaded update, once staged.
    pub staged_update: Option<PathBuf>,

    /// Artists and users the last search matched, beside its tracks.
    pub search_artists: Vec<Artist>,
    pub search_profiles: Vec<Profile>,
    /// Artist details while the artist view is shown.
    pub artist: Option<Artist>,
    pub artist_albums: Vec<Album>,

    /// Unread count from the background refetch; `None` when signed out.
    pub unread_notifications: Option<usize>,
    /// Open notifications panel.
    pub notifications: Option<NotificationsPanel>,
}

/// Notifications as shown in the panel. `unread` is the set that was unread
/// when the panel opened, so the markers survive marking them read.
#[derive(Debug, Clone, Default)]
pub struct NotificationsPanel {
    pub items: Vec<Notification>,
    pub unread: HashSet<String>,
}

impl NotificationsPanel {
    pub fn new(items: Vec<Notification>, read: &HashSet<String>) -> Self {
        let unread = items
            .iter()
            .filter(|n| !read.contains(&n.id))
            .map(|n| n.id.clone())
            .collect();
        Self { items, unread }
    }

    pub fn is_unread(&self, id: &str) -> bool {
        self.unread.contains(id)
    }
}

impl App {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            ..Self::default()
        }
    }

    /// Replace the visible list. Selection goes back to the top and
    /// per-view side data is dropped.
    pub fn show(&mut self, view: View, tracks: Vec<Track>) {
        self.view = view;
        self.tracks = tracks;
        self.selected = 0;
        self.search_artists.clear();
        self.search_profiles.clear();
        self.artist = None;
        self.artist_albums.clear();
    }

    /// Show search results: the tracks in the list, people beside them.
    pub fn show_search(&mut self, term: String, results: SearchResults) {
        self.show(View::Search(term), results.tracks);
        self.search_artists = results.artists;
        self.search_profiles = results.profiles;
    }

    pub fn show_artist(&mut self, page: ArtistPage) {
        self.show(View::Artist(page.artist.name.clone()), page.tracks);
        self.artist = Some(page.artist);
        self.artist_albums = page.albums;
    }

    /// Artist to open from the current selection: the selected track's
    /// artist, or else the first artist a search matched.
    pub fn artist_to_open(&self) -> Option<String> {
        self.selected_track()
            .and_then(|t| t.artist_id())
            .map(str::to_string)
            .or_else(|| match self.view {
                View::Search(_) => self.search_artists.first().map(|a| a.id.clone()),
                _ => None,
            })
    }

    /// Open the panel; everything in it counts as read from now on.
    pub fn open_notifications(&mut self, panel: NotificationsPanel) {
        self.notifications = Some(panel);
        if self.unread_notifications.is_some() {
            self.unread_notifications = Some(0);
        }
    }

    pub fn close_notifications(&mut self) {
        self.notifications = None;
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks.get(self.selected)
    }

    /// Move the cursor onto the track with `id`, if it is listed.
    pub fn select_track_id(&mut self, id: &str) -> bool {
        match self.tracks.iter().position(|t| t.id == id) {
            Some(i) => {
                self.selected = i;
                true
            }
            None => false,
        }
    }

    /// Move selection to the next track, wrapping to the first.
    pub fn next(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.tracks.len();
    }

    /// Move selection to the previous track, wrapping to the last.
    pub fn prev(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        let len = self.tracks.len();
        self.selected = (self.selected + len - 1) % len;
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.tracks.len().saturating_sub(1);
    }

    pub fn enter_search_mode(&mut self) {
        self.search_mode = true;
        self.search_query.clear();
    }

    pub fn exit_search_mode(&mut self) {
        self.search_mode = false;
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search_query.push(c);
    }

    pub fn pop_search_char(&mut self) {
        self.search_query.pop();
    }

    /// The trimmed search query, if it is long enough to send.
    pub fn search_term(&self, min_len: usize) -> Option<&str> {
        let q = self.search_query.trim();
        (q.chars().count() >= min_len).then_some(q)
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Record a shell notice. A staged path only arrives with "downloaded".
    pub fn note_update(&mut self, notice: ShellNotice) {
        self.update = Some(notice);
    }

    pub fn restart_ready(&self) -> bool {
        self.staged_update.is_some()
    }

    /// Fuzzy/subsequence match: return the character positions in `title`
    /// that match `query` (ASCII case-insensitive), or `None` if not matched.
    pub fn fuzzy_match_positions(title: &str, query: &str) -> Option<Vec<usize>> {
        if query.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut title_iter = title.chars().enumerate();

        for qc in query.chars() {
            let qc_low = qc.to_ascii_lowercase();
            loop {
                match title_iter.next() {
                    Some((ti, tc)) if tc.to_ascii_lowercase() == qc_low => {
                        positions.push(ti);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }
}
