use serde::{Deserialize, Deserializer, Serialize};

use super::make_display;

/// The artist a track belongs to (`artists(id, name)` join).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    /// Some list queries only join the name.
    #[serde(default)]
    pub id: String,
    pub name: String,
}

/// The album a track belongs to (`albums(id, title, cover_art_url)` join).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cover_art_url: Option<String>,
}

/// A single playable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(rename = "song_url")]
    pub media_url: String,
    #[serde(default)]
    pub cover_art_url: Option<String>,
    /// A left join yields `null` for a missing artist; that reads as the default.
    #[serde(rename = "artists", default, deserialize_with = "null_as_default")]
    pub artist: ArtistRef,
    #[serde(rename = "albums", default)]
    pub album: Option<AlbumRef>,
}

impl Track {
    pub fn display(&self) -> String {
        make_display(&self.title, Some(&self.artist.name))
    }

    /// Track artwork, falling back to the album cover.
    pub fn artwork_url(&self) -> Option<&str> {
        self.cover_art_url
            .as_deref()
            .or_else(|| self.album.as_ref().and_then(|a| a.cover_art_url.as_deref()))
            .filter(|u| !u.trim().is_empty())
    }

    pub fn artist_id(&self) -> Option<&str> {
        Some(self.artist.id.trim()).filter(|s| !s.is_empty())
    }

    pub fn album_id(&self) -> Option<&str> {
        self.album.as_ref().and_then(|a| a.id.as_deref())
    }

    pub fn album_title(&self) -> Option<&str> {
        self.album
            .as_ref()
            .and_then(|a| a.title.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Treat an explicit JSON `null` like a missing key.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Option::unwrap_or_default)
}

/// An `artists` row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// An `albums` row with its artist joined.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Album {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub cover_art_url: Option<String>,
    #[serde(rename = "artists", default, deserialize_with = "null_as_default")]
    pub artist: ArtistRef,
}

/// A broadcast notification (`notifications` row).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A user profile row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl Profile {
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("anonymous")
    }
}

/// A `liked_songs` row joined with its track (`tracks(...)`).
#[derive(Debug, Clone, Deserialize)]
pub struct LikedTrackRow {
    #[serde(rename = "tracks")]
    pub track: Option<Track>,
}
