//! `rodio`-backed sinks.
//!
//! The factory owns the output stream for the whole session; every track
//! gets its own `rodio::Sink` on that stream's mixer.

use std::io::Cursor;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use reqwest::blocking::Client;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, warn};

use super::fetch::{LoadResult, media_client, spawn_loader};
use super::types::{AudioSink, SinkError, SinkEvent, SinkFactory};

pub struct RodioSinkFactory {
    stream: OutputStream,
    http: Client,
}

impl RodioSinkFactory {
    /// Open the default output device. `fetch_timeout` bounds each media download.
    pub fn new(fetch_timeout: Option<Duration>) -> Result<Self, SinkError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| SinkError::NoOutputDevice(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);

        let http = media_client(fetch_timeout)?;

        Ok(Self { stream, http })
    }
}

impl SinkFactory for RodioSinkFactory {
    type Sink = RodioSink;

    fn open(&mut self, url: &str, volume: f32) -> Result<RodioSink, SinkError> {
        debug!(url, "opening sink");
        let sink = Sink::connect_new(self.stream.mixer());
        let loader = spawn_loader(self.http.clone(), url.to_string());
        Ok(RodioSink::new(sink, loader, volume))
    }
}

/// A sink for one track. Media arrives from a loader thread and is decoded
/// on the first `poll_events` after it lands.
pub struct RodioSink {
    sink: Sink,
    loader: Option<Receiver<LoadResult>>,
    loaded: bool,
    playing: bool,
    pending_seek: Option<Duration>,
    last_pos: Duration,
    ended: bool,
}

impl RodioSink {
    pub(super) fn new(sink: Sink, loader: Receiver<LoadResult>, volume: f32) -> Self {
        sink.pause();
        sink.set_volume(volume);
        Self {
            sink,
            loader: Some(loader),
            loaded: false,
            playing: false,
            pending_seek: None,
            last_pos: Duration::ZERO,
            ended: false,
        }
    }

    fn finish_loading(&mut self, events: &mut Vec<SinkEvent>) {
        let Some(rx) = self.loader.as_ref() else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(r) => r,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                Err(SinkError::Fetch("media loader exited".to_string()))
            }
        };
        self.loader = None;

        match result.and_then(decode) {
            Ok(source) => {
                let total = source.total_duration();
                self.sink.append(source);
                self.loaded = true;
                if let Some(pos) = self.pending_seek.take() {
                    if let Err(e) = self.seek(pos) {
                        warn!(error = %e, "deferred seek failed");
                    }
                }
                if self.playing {
                    self.sink.play();
                }
                events.push(SinkEvent::LoadedMetadata(total));
            }
            Err(e) => events.push(SinkEvent::Error(e)),
        }
    }
}

fn decode(bytes: Vec<u8>) -> Result<Decoder<Cursor<Vec<u8>>>, SinkError> {
    Decoder::new(Cursor::new(bytes)).map_err(|e| SinkError::Decode(e.to_string()))
}

impl AudioSink for RodioSink {
    fn play(&mut self) {
        self.playing = true;
        if self.loaded {
            self.sink.play();
        }
    }

    fn pause(&mut self) {
        self.playing = false;
        self.sink.pause();
    }

    fn seek(&mut self, position: Duration) -> Result<(), SinkError> {
        if !self.loaded {
            self.pending_seek = Some(position);
            return Ok(());
        }
        self.sink
            .try_seek(position)
            .map_err(|e| SinkError::Seek(e.to_string()))?;
        self.last_pos = position;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume);
    }

    fn poll_events(&mut self) -> Vec<SinkEvent> {
        let mut events = Vec::new();
        self.finish_loading(&mut events);

        if !self.loaded || !self.playing || self.ended {
            return events;
        }

        if self.sink.empty() {
            self.ended = true;
            events.push(SinkEvent::Ended);
            return events;
        }

        let pos = self.sink.get_pos();
        if pos != self.last_pos {
            self.last_pos = pos;
            events.push(SinkEvent::TimeUpdate(pos));
        }
        events
    }
}
