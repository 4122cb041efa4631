use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then environment variables
/// (prefix `MELODEX__`) on top, and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("MELODEX")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let url = self.backend.url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err("backend.url must start with http:// or https://".to_string());
        }
        if !(0.0..=1.0).contains(&self.audio.initial_volume) {
            return Err("audio.initial_volume must be within 0.0..=1.0".to_string());
        }
        if !(self.audio.volume_step > 0.0 && self.audio.volume_step <= 1.0) {
            return Err("audio.volume_step must be within (0.0, 1.0]".to_string());
        }
        if self.backend.timeout_secs == 0 {
            return Err("backend.timeout_secs must be >= 1".to_string());
        }
        if self.notifications.refresh_secs == 0 {
            return Err("notifications.refresh_secs must be >= 1".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `MELODEX_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("MELODEX_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/melodex/config.toml`
/// or `~/.config/melodex/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("melodex").join("config.toml"))
}

/// `$XDG_STATE_HOME/melodex` or `~/.local/state/melodex`: logs and staged updates.
pub fn default_state_dir() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("melodex"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
