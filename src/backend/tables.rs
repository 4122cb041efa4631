use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Album, Artist, LikedTrackRow, Profile, Track};

use super::LikeStore;
use super::client::{BackendClient, eq, ilike_contains};
use super::error::Result;

/// Track columns plus the artist and album joins the player needs.
pub(super) const TRACK_SELECT: &str = "*,artists(id,name),albums(id,title,cover_art_url)";

/// Search terms shorter than this return nothing without hitting the backend.
pub const MIN_SEARCH_LEN: usize = 2;
const SEARCH_LIMIT: usize = 10;
/// Artist and profile matches are a side panel; fewer of them.
const SEARCH_PEOPLE_LIMIT: usize = 5;

/// Everything one search term matched.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub tracks: Vec<Track>,
    pub artists: Vec<Artist>,
    pub profiles: Vec<Profile>,
}

/// An artist with their albums and tracks.
#[derive(Debug, Clone)]
pub struct ArtistPage {
    pub artist: Artist,
    pub albums: Vec<Album>,
    pub tracks: Vec<Track>,
}

#[derive(Serialize)]
struct LikedSongRow<'a> {
    user_id: &'a str,
    track_id: &'a str,
}

#[derive(Deserialize)]
struct LikedSongId {
    track_id: String,
}

#[derive(Serialize, Default)]
struct ProfileImagePatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    banner_url: Option<&'a str>,
}

fn long_enough(term: &str) -> bool {
    term.trim().chars().count() >= MIN_SEARCH_LEN
}

impl BackendClient {
    /// Every track, newest releases first.
    pub fn fetch_tracks(&self) -> Result<Vec<Track>> {
        self.select(
            "tracks",
            &[
                ("select", TRACK_SELECT.to_string()),
                ("order", "created_at.desc".to_string()),
            ],
        )
    }

    /// Tracks whose title contains `term`, case-insensitively.
    pub fn search_tracks(&self, term: &str) -> Result<Vec<Track>> {
        if !long_enough(term) {
            return Ok(Vec::new());
        }
        self.select(
            "tracks",
            &[
                ("select", TRACK_SELECT.to_string()),
                ("title", ilike_contains(term)),
                ("limit", SEARCH_LIMIT.to_string()),
            ],
        )
    }

    pub fn search_artists(&self, term: &str) -> Result<Vec<Artist>> {
        if !long_enough(term) {
            return Ok(Vec::new());
        }
        self.select(
            "artists",
            &[
                ("select", "*".to_string()),
                ("name", ilike_contains(term)),
                ("limit", SEARCH_PEOPLE_LIMIT.to_string()),
            ],
        )
    }

    pub fn search_profiles(&self, term: &str) -> Result<Vec<Profile>> {
        if !long_enough(term) {
            return Ok(Vec::new());
        }
        self.select(
            "profiles",
            &[
                ("select", "*".to_string()),
                ("username", ilike_contains(term)),
                ("limit", SEARCH_PEOPLE_LIMIT.to_string()),
            ],
        )
    }

    /// Tracks, artists and users matching `term`.
    pub fn search(&self, term: &str) -> Result<SearchResults> {
        Ok(SearchResults {
            tracks: self.search_tracks(term)?,
            artists: self.search_artists(term)?,
            profiles: self.search_profiles(term)?,
        })
    }

    /// The artist row plus their albums and tracks; `None` if no such artist.
    pub fn fetch_artist_page(&self, artist_id: &str) -> Result<Option<ArtistPage>> {
        let mut artists: Vec<Artist> = self.select(
            "artists",
            &[("select", "*".to_string()), ("id", eq(artist_id))],
        )?;
        let Some(artist) = artists.pop() else {
            return Ok(None);
        };
        let albums = self.select(
            "albums",
            &[
                ("select", "*,artists(id,name)".to_string()),
                ("artist_id", eq(artist_id)),
            ],
        )?;
        let tracks = self.select(
            "tracks",
            &[
                ("select", TRACK_SELECT.to_string()),
                ("artist_id", eq(artist_id)),
            ],
        )?;
        debug!(artist_id, "artist page loaded");
        Ok(Some(ArtistPage {
            artist,
            albums,
            tracks,
        }))
    }

    pub fn fetch_album_tracks(&self, album_id: &str) -> Result<Vec<Track>> {
        self.select(
            "tracks",
            &[
                ("select", TRACK_SELECT.to_string()),
                ("album_id", eq(album_id)),
            ],
        )
    }

    /// The full tracks `user_id` has liked.
    pub fn fetch_liked_tracks(&self, user_id: &str) -> Result<Vec<Track>> {
        let rows: Vec<LikedTrackRow> = self.select(
            "liked_songs",
            &[
                ("select", format!("tracks({TRACK_SELECT})")),
                ("user_id", eq(user_id)),
            ],
        )?;
        Ok(rows.into_iter().filter_map(|r| r.track).collect())
    }

    pub fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let mut rows: Vec<Profile> = self.select(
            "profiles",
            &[("select", "*".to_string()), ("id", eq(user_id))],
        )?;
        Ok(rows.pop())
    }

    pub fn update_profile_avatar(&self, user_id: &str, avatar_url: &str) -> Result<()> {
        self.update(
            "profiles",
            &[("id", eq(user_id))],
            &ProfileImagePatch {
                avatar_url: Some(avatar_url),
                ..ProfileImagePatch::default()
            },
        )
    }

    pub fn update_profile_banner(&self, user_id: &str, banner_url: &str) -> Result<()> {
        self.update(
            "profiles",
            &[("id", eq(user_id))],
            &ProfileImagePatch {
                banner_url: Some(banner_url),
                ..ProfileImagePatch::default()
            },
        )
    }
}

impl LikeStore for BackendClient {
    fn liked_track_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let rows: Vec<LikedSongId> = self.select(
            "liked_songs",
            &[("select", "track_id".to_string()), ("user_id", eq(user_id))],
        )?;
        debug!(user_id, count = rows.len(), "loaded liked songs");
        Ok(rows.into_iter().map(|r| r.track_id).collect())
    }

    fn like(&self, user_id: &str, track_id: &str) -> Result<()> {
        self.insert("liked_songs", &LikedSongRow { user_id, track_id })
    }

    fn unlike(&self, user_id: &str, track_id: &str) -> Result<()> {
        self.delete(
            "liked_songs",
            &[("user_id", eq(user_id)), ("track_id", eq(track_id))],
        )
    }
}
