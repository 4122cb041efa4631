use super::load::{default_config_path, default_state_dir, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_melodex_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("MELODEX_CONFIG_PATH", "/tmp/melodex-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/melodex-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("melodex")
            .join("config.toml")
    );
}

#[test]
fn default_paths_fall_back_to_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::remove("XDG_STATE_HOME");
    let _g3 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.config/melodex/config.toml")
    );
    assert_eq!(
        default_state_dir().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/state/melodex")
    );
}

#[test]
fn defaults_are_valid() {
    let s = Settings::default();
    assert!(s.validate().is_ok());
    assert_eq!(s.audio.initial_volume, 1.0);
    assert_eq!(s.controls.scrub_seconds, 5);
    assert!(s.auth.credentials().is_none());
    assert!(s.update.manifest_url.is_none());
    assert_eq!(s.notifications.refresh_secs, 30);
}

#[test]
fn media_downloads_are_unbounded_unless_configured() {
    let mut audio = AudioSettings::default();
    assert_eq!(audio.fetch_timeout(), None);
    audio.fetch_timeout_secs = Some(0);
    assert_eq!(audio.fetch_timeout(), None);
    audio.fetch_timeout_secs = Some(90);
    assert_eq!(audio.fetch_timeout(), Some(std::time::Duration::from_secs(90)));
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[backend]
url = "https://demo.supabase.co"
anon_key = "anon"
timeout_secs = 12

[auth]
email = "mira@example.com"
password = "hunter2"

[audio]
initial_volume = 0.4
volume_step = 0.1
fetch_timeout_secs = 600

[controls]
scrub_seconds = 9

[ui]
header_text = "hello"
now_playing_time_fields = ["elapsed", "remaining"]
now_playing_time_separator = " | "

[logging]
level = "debug"
file = "/tmp/melodex.log"

[update]
manifest_url = "https://releases.example.com/melodex/latest.toml"

[notifications]
refresh_secs = 120
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("MELODEX_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("MELODEX__AUDIO__INITIAL_VOLUME");

    let s = Settings::load().unwrap();
    assert!(s.validate().is_ok());
    assert_eq!(s.backend.url, "https://demo.supabase.co");
    assert_eq!(s.backend.anon_key, "anon");
    assert_eq!(s.backend.timeout_secs, 12);
    assert_eq!(s.auth.credentials(), Some(("mira@example.com", "hunter2")));
    assert_eq!(s.audio.initial_volume, 0.4);
    assert_eq!(s.audio.volume_step, 0.1);
    assert_eq!(s.audio.fetch_timeout(), Some(std::time::Duration::from_secs(600)));
    assert_eq!(s.notifications.refresh_secs, 120);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(
        s.ui.now_playing_time_fields,
        vec![TimeField::Elapsed, TimeField::Remaining]
    );
    assert_eq!(s.ui.now_playing_time_separator, " | ");
    assert_eq!(s.logging.level, "debug");
    assert_eq!(
        s.logging.file.as_deref(),
        Some(std::path::Path::new("/tmp/melodex.log"))
    );
    assert_eq!(
        s.update.manifest_url.as_deref(),
        Some("https://releases.example.com/melodex/latest.toml")
    );
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[controls]
scrub_seconds = 9
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("MELODEX_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("MELODEX__CONTROLS__SCRUB_SECONDS", "30");

    let s = Settings::load().unwrap();
    assert_eq!(s.controls.scrub_seconds, 30);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut s = Settings::default();
    s.audio.initial_volume = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.volume_step = 0.0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.notifications.refresh_secs = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.backend.url = "ftp://nope".into();
    assert!(s.validate().is_err());
}

#[test]
fn credentials_need_both_fields() {
    let auth = AuthSettings {
        email: Some("a@b.c".into()),
        password: None,
    };
    assert!(auth.credentials().is_none());

    let auth = AuthSettings {
        email: Some("  ".into()),
        password: Some("pw".into()),
    };
    assert!(auth.credentials().is_none());
}
