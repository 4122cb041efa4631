use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::audio::{AudioSink, SinkEvent, SinkFactory};
use crate::backend::LikeStore;
use crate::catalog::Track;
use crate::session::Identity;

use super::state::{PlaybackSession, TransportState, clamp_volume};

/// Single owner of "what is currently audible".
///
/// All transport changes go through here; the sink is never touched by
/// anyone else. Sink events come back in through [`pump`](Self::pump).
pub struct PlayerController<F: SinkFactory, L: LikeStore> {
    factory: F,
    likes: L,
    sink: Option<F::Sink>,
    state: PlaybackSession,
    identity: Option<Identity>,
    liked: HashSet<String>,
    last_error: Option<String>,
}

impl<F: SinkFactory, L: LikeStore> PlayerController<F, L> {
    pub fn new(factory: F, likes: L, volume: f32) -> Self {
        Self {
            factory,
            likes,
            sink: None,
            state: PlaybackSession {
                volume: clamp_volume(volume),
                ..PlaybackSession::default()
            },
            identity: None,
            liked: HashSet::new(),
            last_error: None,
        }
    }

    pub fn state(&self) -> &PlaybackSession {
        &self.state
    }

    pub fn transport(&self) -> TransportState {
        self.state.transport()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.state.current.as_ref()
    }

    pub fn is_current_track_liked(&self) -> bool {
        self.state
            .current
            .as_ref()
            .is_some_and(|t| self.liked.contains(&t.id))
    }

    pub fn liked(&self) -> &HashSet<String> {
        &self.liked
    }

    /// Most recent load/backend failure, for display.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Play `track`, with `queue` as the next/previous context.
    ///
    /// A missing or empty queue plays the track on its own.
    pub fn play_track(&mut self, track: Track, queue: Option<Vec<Track>>) {
        let queue = match queue {
            Some(q) if !q.is_empty() => q,
            _ => vec![track.clone()],
        };
        self.state.index = queue.iter().position(|t| t.id == track.id).unwrap_or(0);
        self.state.queue = queue;
        self.start(track);
    }

    pub fn toggle_play(&mut self) {
        if self.state.current.is_none() {
            return;
        }

        // A track whose load failed has no sink; pressing play retries it.
        if self.sink.is_none() {
            if !self.state.playing {
                self.state.playing = true;
                self.load_current();
            }
            return;
        }

        self.state.playing = !self.state.playing;
        if let Some(sink) = self.sink.as_mut() {
            if self.state.playing {
                sink.play();
            } else {
                sink.pause();
            }
        }
        debug!(playing = self.state.playing, "toggled playback");
    }

    pub fn play_next(&mut self) {
        let len = self.state.queue.len();
        if len == 0 {
            return;
        }
        self.jump_to((self.state.index + 1) % len);
    }

    pub fn play_prev(&mut self) {
        let len = self.state.queue.len();
        if len == 0 {
            return;
        }
        self.jump_to((self.state.index + len - 1) % len);
    }

    /// Move the playback position. Track, queue and transport stay as they are.
    pub fn seek(&mut self, position: Duration) {
        if self.state.current.is_none() {
            return;
        }
        let position = self.state.clamp_position(position);
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.seek(position) {
                warn!(error = %e, "seek failed");
                self.last_error = Some(e.to_string());
            }
        }
        self.state.position = position;
    }

    /// Seek relative to the current position, saturating at zero.
    pub fn seek_by(&mut self, delta_secs: i64) {
        let cur = self.state.position;
        let step = Duration::from_secs(delta_secs.unsigned_abs());
        let target = if delta_secs < 0 {
            cur.saturating_sub(step)
        } else {
            cur.saturating_add(step)
        };
        self.seek(target);
    }

    pub fn change_volume(&mut self, level: f32) {
        let volume = clamp_volume(level);
        if let Some(sink) = self.sink.as_mut() {
            sink.set_volume(volume);
        }
        self.state.volume = volume;
    }

    /// Like or unlike the current track.
    ///
    /// Local membership flips first; if the backend call then fails the
    /// flip is rolled back.
    pub fn toggle_like(&mut self) {
        let (Some(track), Some(identity)) = (self.state.current.as_ref(), self.identity.as_ref())
        else {
            return;
        };
        let track_id = track.id.clone();
        let user_id = identity.user_id.clone();

        let result = if self.liked.remove(&track_id) {
            self.likes
                .unlike(&user_id, &track_id)
                .inspect_err(|_| {
                    self.liked.insert(track_id.clone());
                })
        } else {
            self.liked.insert(track_id.clone());
            self.likes
                .like(&user_id, &track_id)
                .inspect_err(|_| {
                    self.liked.remove(&track_id);
                })
        };

        if let Err(e) = result {
            error!(error = %e, track_id = %track_id, "like toggle failed");
            self.last_error = Some(format!("like failed: {e}"));
        }
    }

    /// Follow an identity change: reload liked songs for the new user,
    /// or forget them on sign-out.
    pub fn set_identity(&mut self, identity: Option<Identity>) {
        let same = match (&self.identity, &identity) {
            (Some(a), Some(b)) => a.user_id == b.user_id,
            (None, None) => true,
            _ => false,
        };
        if same {
            return;
        }

        self.liked.clear();
        self.identity = identity;

        let Some(user_id) = self.identity.as_ref().map(|i| i.user_id.clone()) else {
            return;
        };
        match self.likes.liked_track_ids(&user_id) {
            Ok(ids) => {
                info!(user_id = %user_id, count = ids.len(), "liked songs loaded");
                self.liked.extend(ids);
            }
            Err(e) => {
                warn!(error = %e, "failed to load liked songs");
                self.last_error = Some(format!("could not load likes: {e}"));
            }
        }
    }

    /// Drain the sink's events and apply them.
    ///
    /// Returns `true` if anything changed.
    pub fn pump(&mut self) -> bool {
        let Some(sink) = self.sink.as_mut() else {
            return false;
        };
        let events = sink.poll_events();
        let changed = !events.is_empty();
        for event in events {
            let switches_track = matches!(event, SinkEvent::Ended);
            self.handle_sink_event(event);
            // Anything after an end event belongs to the sink we just dropped.
            if switches_track {
                break;
            }
        }
        changed
    }

    pub fn handle_sink_event(&mut self, event: SinkEvent) {
        match event {
            SinkEvent::TimeUpdate(pos) => {
                self.state.position = self.state.clamp_position(pos);
            }
            SinkEvent::LoadedMetadata(duration) => {
                self.state.duration = duration;
                self.state.position = self.state.clamp_position(self.state.position);
            }
            SinkEvent::Ended => {
                debug!("track ended, advancing");
                self.play_next();
            }
            SinkEvent::Error(e) => {
                error!(error = %e, "media failed to load");
                self.sink = None;
                self.state.playing = false;
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn jump_to(&mut self, index: usize) {
        let track = self.state.queue[index].clone();
        self.state.index = index;
        self.start(track);
    }

    fn start(&mut self, track: Track) {
        info!(track_id = %track.id, title = %track.title, "playing");
        self.state.current = Some(track);
        self.state.position = Duration::ZERO;
        self.state.duration = None;
        self.state.playing = true;
        self.last_error = None;
        self.load_current();
    }

    /// Replace the sink with a fresh one for the current track.
    fn load_current(&mut self) {
        // The old sink goes first so two tracks never overlap.
        self.sink = None;

        let Some(track) = self.state.current.as_ref() else {
            return;
        };
        match self.factory.open(&track.media_url, self.state.volume) {
            Ok(mut sink) => {
                if self.state.playing {
                    sink.play();
                }
                self.sink = Some(sink);
            }
            Err(e) => {
                error!(error = %e, url = %track.media_url, "could not open sink");
                self.state.playing = false;
                self.last_error = Some(e.to_string());
            }
        }
    }
}
