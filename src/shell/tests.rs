use super::update::{UpdateManifest, is_newer, verify_sha256};
use super::*;

#[test]
fn command_channels_round_trip_through_the_allow_list() {
    for cmd in ShellCommand::ALL {
        assert_eq!(ShellCommand::from_channel(cmd.channel()), Some(cmd));
    }
    assert_eq!(ShellCommand::from_channel("update_available"), None);
    assert_eq!(ShellCommand::from_channel("exec"), None);
}

#[test]
fn notice_channels_are_inbound_only() {
    assert_eq!(
        ShellNotice::from_channel("update_downloaded"),
        Some(ShellNotice::UpdateDownloaded)
    );
    assert_eq!(ShellNotice::from_channel("restart_app"), None);
}

#[test]
fn bridge_delivers_commands_and_notices() {
    let (ui, host) = bridge();

    ui.send("close-window").unwrap();
    ui.command(ShellCommand::RestartApp).unwrap();
    assert_eq!(host.try_recv_command(), Some(ShellCommand::CloseWindow));
    assert_eq!(host.try_recv_command(), Some(ShellCommand::RestartApp));
    assert_eq!(host.try_recv_command(), None);

    let notifier = host.notifier();
    notifier.send("update_available").unwrap();
    assert_eq!(ui.try_recv_notice(), Some(ShellNotice::UpdateAvailable));
    assert_eq!(ui.try_recv_notice(), None);
}

#[test]
fn unknown_channels_are_rejected() {
    let (ui, host) = bridge();
    assert_eq!(
        ui.send("open-devtools"),
        Err(ShellError::ChannelNotAllowed("open-devtools".into()))
    );
    assert!(matches!(
        host.notifier().send("close-window"),
        Err(ShellError::ChannelNotAllowed(_))
    ));
    assert_eq!(host.try_recv_command(), None);
}

#[test]
fn sending_after_the_other_end_is_gone_fails() {
    let (ui, host) = bridge();
    drop(host);
    assert_eq!(
        ui.command(ShellCommand::MinimizeWindow),
        Err(ShellError::Disconnected)
    );
}

#[test]
fn version_comparison() {
    assert!(is_newer("0.2.0", "0.1.9"));
    assert!(is_newer("v1.0", "0.9.9"));
    assert!(is_newer("0.1.1", "0.1"));
    assert!(!is_newer("0.1.0", "0.1.0"));
    assert!(!is_newer("0.1.0-beta", "0.1.0"));
    assert!(!is_newer("0.0.9", "0.1.0"));
    assert!(!is_newer("garbage", "0.1.0"));
}

#[test]
fn manifest_parses_toml() {
    let m = UpdateManifest::parse(
        r#"
version = "0.3.1"
url = "https://releases.example.com/melodex-0.3.1"
sha256 = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
"#,
    )
    .unwrap();
    assert_eq!(m.version, "0.3.1");
    assert!(UpdateManifest::parse("version = 3").is_err());
}

#[test]
fn manifest_without_checksum_is_rejected() {
    assert!(
        UpdateManifest::parse(
            r#"
version = "0.3.1"
url = "https://releases.example.com/melodex-0.3.1"
"#,
        )
        .is_err()
    );
}

#[test]
fn download_must_match_manifest_checksum() {
    // sha256("hello")
    let digest = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
    assert!(verify_sha256(b"hello", digest).is_ok());
    assert!(verify_sha256(b"hello", &digest.to_ascii_uppercase()).is_ok());

    let err = verify_sha256(b"hello, tampered", digest).unwrap_err();
    assert!(err.to_string().contains("checksum mismatch"));
}
