//! Client for the hosted backend: auth, table rows and object storage.
//!
//! The API follows the Supabase conventions (`/auth/v1`, `/rest/v1` with
//! PostgREST filters, `/storage/v1`). Calls are blocking; the runtime issues
//! them from its single loop thread.

use std::sync::Arc;

mod auth;
mod client;
mod error;
mod notifications;
mod storage;
mod tables;

pub use auth::{AuthEvent, Session, User};
pub use client::BackendClient;
pub use error::{BackendError, Result};
pub use storage::content_type_for;
pub use notifications::NotificationWatch;
pub use tables::{ArtistPage, MIN_SEARCH_LEN, SearchResults};

/// Liked-songs membership for a user, as the player needs it.
pub trait LikeStore {
    /// Ids of every track `user_id` has liked.
    fn liked_track_ids(&self, user_id: &str) -> Result<Vec<String>>;
    fn like(&self, user_id: &str, track_id: &str) -> Result<()>;
    fn unlike(&self, user_id: &str, track_id: &str) -> Result<()>;
}

impl<T: LikeStore + ?Sized> LikeStore for Arc<T> {
    fn liked_track_ids(&self, user_id: &str) -> Result<Vec<String>> {
        (**self).liked_track_ids(user_id)
    }

    fn like(&self, user_id: &str, track_id: &str) -> Result<()> {
        (**self).like(user_id, track_id)
    }

    fn unlike(&self, user_id: &str, track_id: &str) -> Result<()> {
        (**self).unlike(user_id, track_id)
    }
}
