/// Build the list text for a track: `"Artist - Title"`, or just the title
/// when the artist name is blank.
pub fn make_display(title: &str, artist: Option<&str>) -> String {
    match artist {
        Some(a) if !a.trim().is_empty() => format!("{} - {}", a.trim(), title),
        _ => title.to_string(),
    }
}
