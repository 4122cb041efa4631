//! Command-line entry points besides the TUI.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use tracing::info;

use crate::backend::{BackendClient, BackendError, Session, content_type_for};
use crate::catalog::Profile;
use crate::config::Settings;

const USAGE: &str =
    "usage: melodex [signup <email> <password> | avatar <file> | banner <file> | profile]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Tui,
    Signup { email: String, password: String },
    Avatar { file: PathBuf },
    Banner { file: PathBuf },
    Profile,
}

impl Command {
    /// Parse arguments after the program name.
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Self> {
        let args: Vec<String> = args.into_iter().collect();
        match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            [] => Ok(Command::Tui),
            ["signup", email, password] => Ok(Command::Signup {
                email: email.to_string(),
                password: password.to_string(),
            }),
            ["avatar", file] => Ok(Command::Avatar {
                file: PathBuf::from(file),
            }),
            ["banner", file] => Ok(Command::Banner {
                file: PathBuf::from(file),
            }),
            ["profile"] => Ok(Command::Profile),
            ["-h" | "--help" | "help", ..] => bail!("{USAGE}"),
            _ => bail!("unrecognized arguments\n{USAGE}"),
        }
    }
}

/// Register a new account and report whether it is usable yet.
pub fn signup(settings: &Settings, email: &str, password: &str) -> anyhow::Result<()> {
    let backend = BackendClient::new(&settings.backend)?;
    match backend.sign_up(email, password) {
        Ok(Some(session)) => println!("signed up as {}", session.user.id),
        Ok(None) => println!("check {email} for a confirmation link"),
        Err(BackendError::AuthFailed(msg)) => println!("sign-up failed: {msg}"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Which profile picture an upload replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileImage {
    Avatar,
    Banner,
}

impl ProfileImage {
    fn bucket(self) -> &'static str {
        match self {
            ProfileImage::Avatar => "avatars",
            ProfileImage::Banner => "profile-banners",
        }
    }

    fn stem(self) -> &'static str {
        match self {
            ProfileImage::Avatar => "avatar",
            ProfileImage::Banner => "banner",
        }
    }

    /// Object path for this image of a user, keeping the file's extension.
    pub fn object_path(self, user_id: &str, file: &Path) -> String {
        let stem = self.stem();
        match file.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{user_id}/{stem}.{}", ext.to_ascii_lowercase()),
            None => format!("{user_id}/{stem}"),
        }
    }
}

/// Sign in with the configured credentials. `None` after printing why not.
fn sign_in(settings: &Settings) -> anyhow::Result<Option<(BackendClient, Session)>> {
    let Some((email, password)) = settings.auth.credentials() else {
        return Err(BackendError::AuthRequired).context("set auth.email and auth.password");
    };
    let backend = BackendClient::new(&settings.backend)?;
    match backend.sign_in_with_password(email, password) {
        Ok(session) => Ok(Some((backend, session))),
        Err(BackendError::AuthFailed(msg)) => {
            println!("sign-in failed: {msg}");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Upload `file` as the configured user's avatar or banner and store its
/// URL on the profile.
pub fn upload_image(settings: &Settings, kind: ProfileImage, file: &Path) -> anyhow::Result<()> {
    let Some((backend, session)) = sign_in(settings)? else {
        return Ok(());
    };
    let user_id = &session.user.id;

    let bytes = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let path = kind.object_path(user_id, file);
    let url = backend.upload(kind.bucket(), &path, bytes, content_type_for(file))?;
    match kind {
        ProfileImage::Avatar => backend.update_profile_avatar(user_id, &url)?,
        ProfileImage::Banner => backend.update_profile_banner(user_id, &url)?,
    }
    info!(user_id = %user_id, %url, image = kind.stem(), "profile image updated");
    println!("{url}");
    Ok(())
}

fn profile_lines(profile: &Profile) -> Vec<String> {
    let mut lines = vec![format!("username: {}", profile.display_name())];
    if let Some(url) = &profile.avatar_url {
        lines.push(format!("avatar: {url}"));
    }
    if let Some(url) = &profile.banner_url {
        lines.push(format!("banner: {url}"));
    }
    if profile.is_admin {
        lines.push("role: admin".to_string());
    }
    lines
}

/// Print the configured user's profile.
pub fn show_profile(settings: &Settings) -> anyhow::Result<()> {
    let Some((backend, session)) = sign_in(settings)? else {
        return Ok(());
    };
    match backend.fetch_profile(&session.user.id)? {
        Some(profile) => {
            for line in profile_lines(&profile) {
                println!("{line}");
            }
        }
        None => println!("no profile for {}", session.user.id),
    }
    Ok(())
}

#[cfg(test)]
mod tests;
