//! Sink traits, events and errors shared by the player and the backends.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("no audio output device: {0}")]
    NoOutputDevice(String),
    #[error("failed to fetch media: {0}")]
    Fetch(String),
    #[error("failed to decode media: {0}")]
    Decode(String),
    #[error("seek failed: {0}")]
    Seek(String),
}

/// Things a sink reports about its own playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    /// Playback position moved.
    TimeUpdate(Duration),
    /// Media decoded; total length if the container knows it.
    LoadedMetadata(Option<Duration>),
    /// The media played to its end.
    Ended,
    /// Loading or decoding failed; the sink will not play.
    Error(SinkError),
}

/// One track's worth of audio output.
pub trait AudioSink {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, position: Duration) -> Result<(), SinkError>;
    fn set_volume(&mut self, volume: f32);
    /// Events produced since the last call, oldest first.
    fn poll_events(&mut self) -> Vec<SinkEvent>;
}

/// Opens a fresh sink per track.
pub trait SinkFactory {
    type Sink: AudioSink;

    /// Open a paused sink for `url` at `volume`. Loading may continue in the
    /// background; its outcome arrives as `LoadedMetadata` or `Error`.
    fn open(&mut self, url: &str, volume: f32) -> Result<Self::Sink, SinkError>;
}
