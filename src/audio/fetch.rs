//! Media loading off the UI thread.

use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use super::types::SinkError;

pub(super) type LoadResult = Result<Vec<u8>, SinkError>;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for media. `total` bounds a whole download; `None` lets a
/// long track take as long as the link needs once connected.
pub(super) fn media_client(total: Option<Duration>) -> Result<Client, SinkError> {
    Client::builder()
        .user_agent(format!("melodex/{}", env!("CARGO_PKG_VERSION")))
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(total)
        .build()
        .map_err(|e| SinkError::Fetch(e.to_string()))
}

/// Fetch `url` on a background thread; the bytes (or the error) arrive on the receiver.
pub(super) fn spawn_loader(http: Client, url: String) -> Receiver<LoadResult> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = load_media(&http, &url);
        // The sink may be gone already (track skipped); nobody to tell.
        let _ = tx.send(result);
    });
    rx
}

/// Read media bytes from an HTTP(S) URL, a `file://` URL or a plain path.
pub(super) fn load_media(http: &Client, url: &str) -> LoadResult {
    if url.starts_with("http://") || url.starts_with("https://") {
        debug!(url, "fetching media");
        let response = http
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| SinkError::Fetch(e.to_string()))?;
        let bytes = response
            .bytes()
            .map_err(|e| SinkError::Fetch(e.to_string()))?;
        return Ok(bytes.to_vec());
    }

    let path = url.strip_prefix("file://").unwrap_or(url);
    if path.trim().is_empty() {
        return Err(SinkError::Fetch("empty media URL".to_string()));
    }
    std::fs::read(path).map_err(|e| SinkError::Fetch(format!("{path}: {e}")))
}
