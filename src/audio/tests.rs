use std::sync::mpsc;
use std::time::Duration;

use reqwest::blocking::Client;
use rodio::Sink;

use super::fetch::{LoadResult, load_media, media_client};
use super::*;

/// A tiny mono 16-bit PCM WAV: `samples` of silence at `rate` Hz.
fn wav_bytes(rate: u32, samples: u32) -> Vec<u8> {
    let data_len = samples * 2;
    let mut v = Vec::with_capacity(44 + data_len as usize);
    v.extend_from_slice(b"RIFF");
    v.extend_from_slice(&(36 + data_len).to_le_bytes());
    v.extend_from_slice(b"WAVEfmt ");
    v.extend_from_slice(&16u32.to_le_bytes());
    v.extend_from_slice(&1u16.to_le_bytes()); // PCM
    v.extend_from_slice(&1u16.to_le_bytes()); // mono
    v.extend_from_slice(&rate.to_le_bytes());
    v.extend_from_slice(&(rate * 2).to_le_bytes());
    v.extend_from_slice(&2u16.to_le_bytes());
    v.extend_from_slice(&16u16.to_le_bytes());
    v.extend_from_slice(b"data");
    v.extend_from_slice(&data_len.to_le_bytes());
    v.resize(44 + data_len as usize, 0);
    v
}

/// A sink that is not attached to any device; the queue output must stay alive.
fn detached_sink(result: Option<LoadResult>) -> (RodioSink, rodio::queue::SourcesQueueOutput) {
    let (sink, output) = Sink::new();
    let (tx, rx) = mpsc::channel();
    if let Some(r) = result {
        tx.send(r).unwrap();
    } else {
        std::mem::forget(tx);
    }
    (RodioSink::new(sink, rx, 0.5), output)
}

#[test]
fn load_media_reads_plain_paths_and_file_urls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("song.wav");
    std::fs::write(&path, b"abc").unwrap();
    let http = Client::new();

    assert_eq!(load_media(&http, path.to_str().unwrap()).unwrap(), b"abc");
    let url = format!("file://{}", path.display());
    assert_eq!(load_media(&http, &url).unwrap(), b"abc");
}

#[test]
fn load_media_reports_missing_files_and_empty_urls() {
    let http = Client::new();
    assert!(matches!(
        load_media(&http, "/definitely/not/here.mp3"),
        Err(SinkError::Fetch(_))
    ));
    assert!(matches!(load_media(&http, ""), Err(SinkError::Fetch(_))));
}

#[test]
fn pending_loader_produces_no_events() {
    let (mut sink, _out) = detached_sink(None);
    sink.play();
    assert!(sink.poll_events().is_empty());
}

#[test]
fn fetch_failure_surfaces_once() {
    let (mut sink, _out) = detached_sink(Some(Err(SinkError::Fetch("404".into()))));
    assert_eq!(
        sink.poll_events(),
        vec![SinkEvent::Error(SinkError::Fetch("404".into()))]
    );
    assert!(sink.poll_events().is_empty());
}

#[test]
fn undecodable_media_is_a_decode_error() {
    let (mut sink, _out) = detached_sink(Some(Ok(b"definitely not audio".to_vec())));
    let events = sink.poll_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], SinkEvent::Error(SinkError::Decode(_))));
}

#[test]
fn loader_that_vanishes_is_a_fetch_error() {
    let (sink, output) = Sink::new();
    let (tx, rx) = mpsc::channel::<LoadResult>();
    drop(tx);
    let mut sink = RodioSink::new(sink, rx, 1.0);
    let _output = output;
    assert!(matches!(
        sink.poll_events().as_slice(),
        [SinkEvent::Error(SinkError::Fetch(_))]
    ));
}

#[test]
fn decoded_media_reports_its_length() {
    let (mut sink, _out) = detached_sink(Some(Ok(wav_bytes(8_000, 800))));
    sink.play();
    let events = sink.poll_events();
    match events.as_slice() {
        [SinkEvent::LoadedMetadata(Some(d))] => {
            assert!(
                *d >= Duration::from_millis(90) && *d <= Duration::from_millis(110),
                "unexpected duration {d:?}"
            );
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn seek_before_load_is_deferred() {
    let (mut sink, _out) = detached_sink(None);
    sink.play();
    assert!(sink.seek(Duration::from_secs(3)).is_ok());
    assert!(sink.poll_events().is_empty());
}

#[test]
fn drained_source_reports_progress_then_ends_once() {
    let (mut sink, mut output) = detached_sink(Some(Ok(wav_bytes(8_000, 800))));
    sink.play();
    assert!(matches!(
        sink.poll_events().as_slice(),
        [SinkEvent::LoadedMetadata(_)]
    ));

    // Pull samples the way a device would, polling between chunks.
    let mut seen = Vec::new();
    for _ in 0..200 {
        output.by_ref().take(100).for_each(drop);
        let events = sink.poll_events();
        let ended = events.contains(&SinkEvent::Ended);
        seen.extend(events);
        if ended {
            break;
        }
    }

    assert!(seen.iter().any(|e| matches!(e, SinkEvent::TimeUpdate(_))));
    assert_eq!(seen.iter().filter(|e| **e == SinkEvent::Ended).count(), 1);
    assert_eq!(seen.last(), Some(&SinkEvent::Ended));
    assert!(sink.poll_events().is_empty());
}

/// Serve one request, holding the response back for `delay`.
fn slow_server(delay: Duration, body: &'static [u8]) -> String {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((mut conn, _)) = listener.accept() {
            let mut buf = [0u8; 1024];
            let _ = conn.read(&mut buf);
            std::thread::sleep(delay);
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = conn.write_all(head.as_bytes());
            let _ = conn.write_all(body);
        }
    });
    format!("http://{addr}/track.wav")
}

#[test]
fn media_client_without_a_limit_waits_for_slow_downloads() {
    let url = slow_server(Duration::from_millis(300), b"slow but fine");
    let http = media_client(None).unwrap();
    assert_eq!(load_media(&http, &url).unwrap(), b"slow but fine");
}

#[test]
fn media_client_honors_a_configured_limit() {
    let url = slow_server(Duration::from_millis(600), b"too late");
    let http = media_client(Some(Duration::from_millis(100))).unwrap();
    assert!(matches!(load_media(&http, &url), Err(SinkError::Fetch(_))));
}
