//! Playback controller: current track, queue, transport, volume and likes.
//!
//! States are Idle (nothing loaded), Playing and Paused. `play_track` leaves
//! Idle; `toggle_play` flips between Playing and Paused; next/previous and
//! end-of-track keep Playing. There is no way back to Idle.

mod controller;
mod state;

pub use controller::PlayerController;
pub use state::{PlaybackSession, TransportState, clamp_volume};
