use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{self, LoggingSettings};

/// Where logs go: `logging.file`, else `<state dir>/melodex.log`.
pub fn log_path(settings: &LoggingSettings) -> Option<PathBuf> {
    settings
        .file
        .clone()
        .or_else(|| config::default_state_dir().map(|d| d.join("melodex.log")))
}

/// Install the global subscriber. The terminal belongs to the UI, so
/// everything is written to a file. `RUST_LOG` wins over `logging.level`.
pub fn init(settings: &LoggingSettings) -> anyhow::Result<Option<PathBuf>> {
    let Some(path) = log_path(settings) else {
        return Ok(None);
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()?;
    Ok(Some(path))
}
