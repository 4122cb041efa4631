use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/melodex/config.toml` or `~/.config/melodex/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `MELODEX__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendSettings,
    pub auth: AuthSettings,
    pub audio: AudioSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub logging: LoggingSettings,
    pub update: UpdateSettings,
    pub notifications: NotificationSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Credentials used to sign in at startup. Both must be set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl AuthSettings {
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => Some((e.trim(), p)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Volume the player starts with (0.0 - 1.0).
    pub initial_volume: f32,
    /// Volume change per `+`/`-` press.
    pub volume_step: f32,
    /// Upper bound on downloading one track. Unset or 0 means no limit;
    /// whole files are fetched before decoding, so long tracks need time.
    pub fetch_timeout_secs: Option<u64>,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            initial_volume: 1.0,
            volume_step: 0.05,
            fetch_timeout_secs: None,
        }
    }
}

impl AudioSettings {
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,

    /// Which time fields to show for the status line, and in what order.
    ///
    /// Example: ["elapsed", "total", "remaining"]
    pub now_playing_time_fields: Vec<TimeField>,

    /// Separator used to join `now_playing_time_fields`.
    pub now_playing_time_separator: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ melodex ~ ".to_string(),
            now_playing_time_fields: vec![TimeField::Elapsed, TimeField::Total, TimeField::Remaining],
            now_playing_time_separator: " / ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { scrub_seconds: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` overrides it.
    pub level: String,
    /// Log file. The terminal belongs to the UI, so logs never go to stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateSettings {
    /// URL of a TOML manifest with `version` and `url`. Unset disables update checks.
    pub manifest_url: Option<String>,
    /// Where downloaded updates are staged. Defaults to the state directory.
    pub staging_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Seconds between refetches of the unread count.
    pub refresh_secs: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self { refresh_secs: 30 }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeField {
    Elapsed,
    Total,
    Remaining,
}
