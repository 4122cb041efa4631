//! Background update check: compare a published manifest with our version,
//! download the new build into the staging directory and tell the UI.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use anyhow::{Context, bail};
use reqwest::blocking::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::{ShellNotice, ShellNotifier};

/// Published release manifest (TOML).
///
/// ```toml
/// version = "0.2.0"
/// url = "https://releases.example.com/melodex-0.2.0"
/// sha256 = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateManifest {
    pub version: String,
    pub url: String,
    /// Hex SHA-256 of the binary at `url`.
    pub sha256: String,
}

impl UpdateManifest {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid update manifest")
    }
}

/// Fail unless `bytes` hash to the hex digest `expected` (case-insensitive).
pub fn verify_sha256(bytes: &[u8], expected: &str) -> anyhow::Result<()> {
    let actual = hex::encode(Sha256::digest(bytes));
    let expected = expected.trim();
    if !actual.eq_ignore_ascii_case(expected) {
        bail!("checksum mismatch: manifest says {expected}, download is {actual}");
    }
    Ok(())
}

/// `true` when `candidate` is a strictly higher dotted version than `current`.
/// Missing components count as zero; a leading `v` and any `-suffix` are ignored.
pub fn is_newer(candidate: &str, current: &str) -> bool {
    fn parts(v: &str) -> Option<Vec<u64>> {
        let v = v.trim().trim_start_matches('v');
        let core = v.split(['-', '+']).next().unwrap_or(v);
        core.split('.').map(|p| p.parse().ok()).collect()
    }
    let (Some(mut a), Some(mut b)) = (parts(candidate), parts(current)) else {
        return false;
    };
    let len = a.len().max(b.len());
    a.resize(len, 0);
    b.resize(len, 0);
    a > b
}

/// Check for an update on a background thread.
///
/// The receiver yields the staged binary's path once it is downloaded.
pub fn spawn_update_check(
    manifest_url: String,
    staging_dir: PathBuf,
    notifier: ShellNotifier,
) -> Receiver<PathBuf> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || match check_and_stage(&manifest_url, &staging_dir, &notifier) {
        Ok(Some(path)) => {
            let _ = tx.send(path);
            let _ = notifier.notify(ShellNotice::UpdateDownloaded);
        }
        Ok(None) => info!("already up to date"),
        Err(e) => warn!(error = %e, "update check failed"),
    });
    rx
}

fn check_and_stage(
    manifest_url: &str,
    staging_dir: &Path,
    notifier: &ShellNotifier,
) -> anyhow::Result<Option<PathBuf>> {
    let http = Client::builder()
        .timeout(Duration::from_secs(300))
        .build()?;

    let text = http
        .get(manifest_url)
        .send()
        .and_then(|r| r.error_for_status())
        .context("fetching update manifest")?
        .text()?;
    let manifest = UpdateManifest::parse(&text)?;

    let current = env!("CARGO_PKG_VERSION");
    if !is_newer(&manifest.version, current) {
        return Ok(None);
    }
    info!(current, available = %manifest.version, "update available");
    notifier.notify(ShellNotice::UpdateAvailable)?;

    let bytes = http
        .get(&manifest.url)
        .send()
        .and_then(|r| r.error_for_status())
        .context("downloading update")?
        .bytes()?;
    if bytes.is_empty() {
        bail!("downloaded update is empty");
    }
    // Nothing unverified ever reaches the staging directory.
    verify_sha256(&bytes, &manifest.sha256)?;

    std::fs::create_dir_all(staging_dir)
        .with_context(|| format!("creating {}", staging_dir.display()))?;
    let path = staging_dir.join(format!("melodex-{}", manifest.version));
    std::fs::write(&path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    make_executable(&path)?;

    info!(path = %path.display(), "update staged");
    Ok(Some(path))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}
