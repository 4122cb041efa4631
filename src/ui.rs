//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, NotificationsPanel, View};
use crate::catalog::Track;
use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::player::TransportState;
use crate::shell::ShellNotice;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("enter", "play selected");
    map.insert("a", "play album");
    map.insert("A", "artist");
    map.insert("space", "play/pause");
    map.insert("h/l", "prev/next song");
    // H/L is filled dynamically from config.
    map.insert("+/-", "volume");
    map.insert("f", "like");
    map.insert("F", "liked songs");
    map.insert("/", "search");
    map.insert("r", "releases");
    map.insert("n", "notifications");
    map.insert("R", "restart to update");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64, restart_ready: bool) -> String {
    let order = [
        "j/k", "h/l", "H/L", "enter", "a", "A", "space", "+/-", "f", "F", "gg/G", "/", "r", "n",
        "R", "q",
    ];
    order
        .iter()
        .filter(|k| **k != "R" || restart_ready)
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{scrub_seconds}s"))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{k}] {v}"))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(
    elapsed: Duration,
    total: Option<Duration>,
    ui: &UiSettings,
) -> Option<String> {
    if ui.now_playing_time_fields.is_empty() {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    let rem = t.saturating_sub(elapsed);
                    parts.push(format!("-{}", format_mmss(rem)));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

/// Snapshot of the player for one frame.
pub struct NowPlaying<'a> {
    pub track: Option<&'a Track>,
    pub transport: TransportState,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub volume: f32,
    pub liked: bool,
    pub error: Option<&'a str>,
}

fn status_text(app: &App, now: &NowPlaying<'_>, ui: &UiSettings) -> String {
    let mut parts: Vec<String> = Vec::new();

    match now.track {
        Some(track) => {
            let marker = if now.liked { "♥ " } else { "" };
            let song = format!("{marker}{}", track.display());
            match now_playing_time_text(now.position, now.duration, ui) {
                Some(time) => parts.push(format!("Song: {song} [{time}]")),
                None => parts.push(format!("Song: {song}")),
            }
            let state = match now.transport {
                TransportState::Playing => "Playing",
                TransportState::Paused => "Paused",
                TransportState::Idle => "Idle",
            };
            parts.push(state.to_string());
        }
        None => parts.push("Nothing playing".to_string()),
    }

    parts.push(format!("Vol: {:.0}%", now.volume * 100.0));

    if app.search_mode {
        parts.push(format!("SEARCH: {}", app.search_query));
    }

    match (app.update, app.restart_ready()) {
        (_, true) => parts.push("Update ready, press R to restart".to_string()),
        (Some(ShellNotice::UpdateAvailable), false) => {
            parts.push("Downloading update...".to_string())
        }
        _ => {}
    }

    if let Some(msg) = &app.status {
        parts.push(msg.clone());
    }
    if let Some(err) = now.error {
        parts.push(format!("Error: {err}"));
    }

    parts.join(" • ")
}

/// Bottom title of the header: who is signed in, and their unread count.
fn header_user(app: &App) -> String {
    let Some(profile) = &app.profile else {
        return " signed out ".to_string();
    };
    let mut user = format!(" {}", profile.display_name());
    if profile.is_admin {
        user.push_str(" (admin)");
    }
    if let Some(n) = app.unread_notifications.filter(|n| *n > 0) {
        user.push_str(&format!(" ✉ {n}"));
    }
    user.push(' ');
    user
}

/// Extra line above the list for views that carry more than tracks.
fn details_text(app: &App) -> Option<String> {
    match &app.view {
        View::Search(_) => {
            let mut parts = Vec::new();
            if !app.search_artists.is_empty() {
                let names: Vec<&str> = app.search_artists.iter().map(|a| a.name.as_str()).collect();
                parts.push(format!("Artists: {}", names.join(", ")));
            }
            if !app.search_profiles.is_empty() {
                let names: Vec<&str> = app
                    .search_profiles
                    .iter()
                    .map(|p| p.display_name())
                    .collect();
                parts.push(format!("Users: {}", names.join(", ")));
            }
            (!parts.is_empty()).then(|| parts.join(" • "))
        }
        View::Artist(_) => {
            let artist = app.artist.as_ref()?;
            let mut parts = Vec::new();
            if let Some(desc) = artist.description.as_deref().filter(|d| !d.is_empty()) {
                parts.push(desc.to_string());
            }
            if !app.artist_albums.is_empty() {
                let titles: Vec<&str> = app.artist_albums.iter().map(|a| a.title.as_str()).collect();
                parts.push(format!("Albums: {}", titles.join(", ")));
            }
            (!parts.is_empty()).then(|| parts.join(" • "))
        }
        _ => None,
    }
}

fn notifications_text(panel: &NotificationsPanel) -> String {
    if panel.items.is_empty() {
        return "No notifications".to_string();
    }
    panel
        .items
        .iter()
        .map(|n| {
            let marker = if panel.is_unread(&n.id) { "● " } else { "  " };
            match n.content.as_deref().filter(|c| !c.is_empty()) {
                Some(content) => format!("{marker}{}: {content}", n.title),
                None => format!("{marker}{}", n.title),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    now: &NowPlaying<'_>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let user = header_user(app);
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" melodex ")
                .title_alignment(Alignment::Center)
                .title_bottom(user),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status_par = Paragraph::new(status_text(app, now, ui_settings))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Main list, with a details line above it when the view has one
    let details = details_text(app);
    let list_area = match &details {
        Some(text) => {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(1)])
                .split(chunks[2]);
            let par = Paragraph::new(text.as_str())
                .block(Block::bordered().title(" details "))
                .wrap(Wrap { trim: true });
            frame.render_widget(par, parts[0]);
            parts[1]
        }
        None => chunks[2],
    };
    {
        let q = match &app.view {
            View::Search(q) => q.as_str(),
            _ => "",
        };
        let playing_id = now.track.map(|t| t.id.as_str());

        // Center the selected item when possible by creating a visible window.
        let total = app.tracks.len();
        let list_height = list_area.height.saturating_sub(2) as usize;
        let sel_pos = app.selected.min(total.saturating_sub(1));
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = app.tracks[start..end]
            .iter()
            .map(|track| {
                let mut title = track.display();
                if !q.is_empty() {
                    if let Some(positions) = App::fuzzy_match_positions(&title, q) {
                        title = uppercase_at(&title, &positions);
                    }
                }
                if Some(track.id.as_str()) == playing_id {
                    title = format!("♪ {title}");
                }
                ListItem::new(title)
            })
            .collect();

        let list = List::new(visible_items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(app.view.title()),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, list_area, &mut state);
    }

    if let Some(panel) = &app.notifications {
        let height = (panel.items.len() as u16).saturating_add(2);
        let popup_area = centered_rect_sized(72, height, chunks[2]);
        frame.render_widget(Clear, popup_area);
        let par = Paragraph::new(notifications_text(panel))
            .block(
                Block::default()
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    })
                    .borders(Borders::ALL)
                    .title(" notifications (n closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(par, popup_area);
    }

    let footer_text = controls_text(controls_settings.scrub_seconds, app.restart_ready());
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}

/// Uppercase the characters at `positions` (sorted char indices).
fn uppercase_at(title: &str, positions: &[usize]) -> String {
    let mut rendered = String::with_capacity(title.len());
    let mut pos_iter = positions.iter().copied();
    let mut next_pos = pos_iter.next();

    for (ci, ch) in title.chars().enumerate() {
        if next_pos == Some(ci) {
            rendered.extend(ch.to_uppercase());
            next_pos = pos_iter.next();
        } else {
            rendered.push(ch);
        }
    }
    rendered
}

#[cfg(test)]
mod tests;
