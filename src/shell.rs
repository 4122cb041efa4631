//! Narrow message channel between the UI and the application shell.
//!
//! Only allow-listed channels pass in either direction: window and restart
//! commands go out, update notices come in. Anything else is rejected.

use std::sync::mpsc::{self, Receiver, Sender};

use thiserror::Error;
use tracing::debug;

mod update;

pub use update::spawn_update_check;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    #[error("channel {0:?} is not allowed")]
    ChannelNotAllowed(String),
    #[error("shell bridge disconnected")]
    Disconnected,
}

/// Commands the UI may send to the shell.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    RestartApp,
    MinimizeWindow,
    MaximizeWindow,
    CloseWindow,
}

impl ShellCommand {
    pub const ALL: [ShellCommand; 4] = [
        ShellCommand::RestartApp,
        ShellCommand::MinimizeWindow,
        ShellCommand::MaximizeWindow,
        ShellCommand::CloseWindow,
    ];

    pub fn channel(self) -> &'static str {
        match self {
            ShellCommand::RestartApp => "restart_app",
            ShellCommand::MinimizeWindow => "minimize-window",
            ShellCommand::MaximizeWindow => "maximize-window",
            ShellCommand::CloseWindow => "close-window",
        }
    }

    pub fn from_channel(channel: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.channel() == channel)
    }
}

/// Notices the shell may send to the UI.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShellNotice {
    UpdateAvailable,
    UpdateDownloaded,
}

impl ShellNotice {
    pub const ALL: [ShellNotice; 2] = [ShellNotice::UpdateAvailable, ShellNotice::UpdateDownloaded];

    pub fn channel(self) -> &'static str {
        match self {
            ShellNotice::UpdateAvailable => "update_available",
            ShellNotice::UpdateDownloaded => "update_downloaded",
        }
    }

    pub fn from_channel(channel: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.channel() == channel)
    }
}

/// The UI's end of the bridge.
pub struct ShellBridge {
    commands: Sender<ShellCommand>,
    notices: Receiver<ShellNotice>,
}

/// The shell's end of the bridge.
pub struct ShellHost {
    commands: Receiver<ShellCommand>,
    notices: ShellNotifier,
}

/// Cloneable sender for notices, so background workers can publish.
#[derive(Clone)]
pub struct ShellNotifier {
    tx: Sender<ShellNotice>,
}

pub fn bridge() -> (ShellBridge, ShellHost) {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (notice_tx, notice_rx) = mpsc::channel();
    (
        ShellBridge {
            commands: cmd_tx,
            notices: notice_rx,
        },
        ShellHost {
            commands: cmd_rx,
            notices: ShellNotifier { tx: notice_tx },
        },
    )
}

impl ShellBridge {
    pub fn command(&self, cmd: ShellCommand) -> Result<(), ShellError> {
        debug!(channel = cmd.channel(), "shell command");
        self.commands
            .send(cmd)
            .map_err(|_| ShellError::Disconnected)
    }

    /// Send by channel name; names outside the allow-list are refused.
    pub fn send(&self, channel: &str) -> Result<(), ShellError> {
        let cmd = ShellCommand::from_channel(channel)
            .ok_or_else(|| ShellError::ChannelNotAllowed(channel.to_string()))?;
        self.command(cmd)
    }

    pub fn try_recv_notice(&self) -> Option<ShellNotice> {
        self.notices.try_recv().ok()
    }
}

impl ShellHost {
    pub fn notifier(&self) -> ShellNotifier {
        self.notices.clone()
    }

    pub fn try_recv_command(&self) -> Option<ShellCommand> {
        self.commands.try_recv().ok()
    }
}

impl ShellNotifier {
    pub fn notify(&self, notice: ShellNotice) -> Result<(), ShellError> {
        debug!(channel = notice.channel(), "shell notice");
        self.tx.send(notice).map_err(|_| ShellError::Disconnected)
    }

    /// Publish by channel name; names outside the allow-list are refused.
    pub fn send(&self, channel: &str) -> Result<(), ShellError> {
        let notice = ShellNotice::from_channel(channel)
            .ok_or_else(|| ShellError::ChannelNotAllowed(channel.to_string()))?;
        self.notify(notice)
    }
}

#[cfg(test)]
mod tests;
