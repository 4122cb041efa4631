//! Observable playback state.

use std::time::Duration;

use crate::catalog::Track;

/// Transport state as the UI and MPRIS see it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TransportState {
    /// Nothing has been played yet.
    #[default]
    Idle,
    Playing,
    Paused,
}

/// The controller's live state. Only the controller writes it.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub current: Option<Track>,
    pub queue: Vec<Track>,
    /// Position of `current` in `queue`; 0 when it is not in the queue.
    pub index: usize,
    pub playing: bool,
    pub position: Duration,
    /// `None` until the sink reports metadata.
    pub duration: Option<Duration>,
    pub volume: f32,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self {
            current: None,
            queue: Vec::new(),
            index: 0,
            playing: false,
            position: Duration::ZERO,
            duration: None,
            volume: 1.0,
        }
    }
}

impl PlaybackSession {
    pub fn transport(&self) -> TransportState {
        match (&self.current, self.playing) {
            (None, _) => TransportState::Idle,
            (Some(_), true) => TransportState::Playing,
            (Some(_), false) => TransportState::Paused,
        }
    }

    /// Clamp `position` into `[0, duration]` once the duration is known.
    pub(super) fn clamp_position(&self, position: Duration) -> Duration {
        match self.duration {
            Some(d) => position.min(d),
            None => position,
        }
    }
}

/// Clamp a requested volume into `[0, 1]`. NaN counts as silence.
pub fn clamp_volume(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}
