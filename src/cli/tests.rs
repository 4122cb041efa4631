use super::*;

fn args(a: &[&str]) -> Vec<String> {
    a.iter().map(|s| s.to_string()).collect()
}

#[test]
fn no_arguments_runs_the_tui() {
    assert_eq!(Command::parse(args(&[])).unwrap(), Command::Tui);
}

#[test]
fn parses_signup_and_avatar() {
    assert_eq!(
        Command::parse(args(&["signup", "a@b.c", "hunter22"])).unwrap(),
        Command::Signup {
            email: "a@b.c".into(),
            password: "hunter22".into(),
        }
    );
    assert_eq!(
        Command::parse(args(&["avatar", "me.png"])).unwrap(),
        Command::Avatar {
            file: PathBuf::from("me.png"),
        }
    );
}

#[test]
fn rejects_incomplete_or_unknown_commands() {
    assert!(Command::parse(args(&["signup", "a@b.c"])).is_err());
    assert!(Command::parse(args(&["avatar"])).is_err());
    assert!(Command::parse(args(&["dance"])).is_err());
    let help = Command::parse(args(&["--help"])).unwrap_err().to_string();
    assert!(help.starts_with("usage:"));
}

#[test]
fn parses_banner_and_profile() {
    assert_eq!(
        Command::parse(args(&["banner", "wide.jpg"])).unwrap(),
        Command::Banner {
            file: PathBuf::from("wide.jpg"),
        }
    );
    assert_eq!(Command::parse(args(&["profile"])).unwrap(), Command::Profile);
    assert!(Command::parse(args(&["profile", "extra"])).is_err());
}

#[test]
fn image_paths_keep_lowercased_extension() {
    let avatar = ProfileImage::Avatar;
    assert_eq!(avatar.object_path("u1", Path::new("/tmp/Me.PNG")), "u1/avatar.png");
    assert_eq!(avatar.object_path("u1", Path::new("face")), "u1/avatar");
    assert_eq!(
        ProfileImage::Banner.object_path("u1", Path::new("wide.JPG")),
        "u1/banner.jpg"
    );
}

#[test]
fn banners_go_to_their_own_bucket() {
    assert_eq!(ProfileImage::Avatar.bucket(), "avatars");
    assert_eq!(ProfileImage::Banner.bucket(), "profile-banners");
}

#[test]
fn profile_listing_includes_banner_and_role() {
    let profile = Profile {
        id: "u1".into(),
        username: Some("ada".into()),
        avatar_url: None,
        banner_url: Some("https://cdn.example.com/b.png".into()),
        is_admin: true,
    };
    assert_eq!(
        profile_lines(&profile),
        vec![
            "username: ada".to_string(),
            "banner: https://cdn.example.com/b.png".to_string(),
            "role: admin".to_string(),
        ]
    );
}
