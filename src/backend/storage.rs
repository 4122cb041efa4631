use reqwest::Method;
use tracing::info;

use super::client::{BackendClient, check};
use super::error::Result;

impl BackendClient {
    /// Public URL of an object in a public bucket.
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket,
            path.trim_start_matches('/')
        )
    }

    /// Upload `bytes` under `bucket/path`, replacing any existing object,
    /// and return its public URL.
    pub fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let path = path.trim_start_matches('/');
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path);
        let size = bytes.len();
        let response = self
            .request(Method::POST, &url)
            .header("x-upsert", "true")
            .header("content-type", content_type)
            .body(bytes)
            .send()?;
        check(response)?;
        info!(bucket, path, size, "uploaded object");
        Ok(self.public_url(bucket, path))
    }
}

/// Best-effort content type from a file extension.
pub fn content_type_for(path: &std::path::Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp3") => "audio/mpeg",
        Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("wav") => "audio/wav",
        _ => "application/octet-stream",
    }
}
