use std::time::Duration;

use crate::mpris::MprisHandle;
use crate::player::{PlaybackSession, TransportState};

/// What MPRIS last saw; used to skip redundant updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MprisSnapshot {
    track_id: Option<String>,
    index: usize,
    transport: TransportState,
    duration: Option<Duration>,
    volume: f32,
}

impl MprisSnapshot {
    pub fn of(state: &PlaybackSession) -> Self {
        Self {
            track_id: state.current.as_ref().map(|t| t.id.clone()),
            index: state.index,
            transport: state.transport(),
            duration: state.duration,
            volume: state.volume,
        }
    }
}

pub fn update_mpris(mpris: &MprisHandle, state: &PlaybackSession) {
    let track = state.current.as_ref();
    mpris.set_track_metadata(track.map(|_| state.index), track, state.duration);
    mpris.set_playback(state.transport());
    mpris.set_volume(state.volume);
}
