//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, Pane};
use crate::config::UiSettings;
use crate::session::{PlaybackSession, SeekSync, SessionState};
use crate::theme::Theme;

const CONTROLS: &str = "[Tab] sources/tracks | [j/k] move | [enter] play | [space] pause | \
[←/→ enter] seek | [/] filter/search | [h/l] prev/next | [x] stop | [S] save cache | \
[r] reload | [+/-] volume | [q] quit";

/// Format seconds as `MM:SS`.
fn format_mmss(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

fn transport_label(session: &PlaybackSession, seek: &SeekSync) -> String {
    let duration = session.duration_secs();
    let total = if duration > 0.0 {
        format_mmss(duration)
    } else {
        "--:--".to_string()
    };

    match seek.pending() {
        Some(pending) => format!("seek → {} / {}", format_mmss(pending), total),
        None => format!("{} / {}", format_mmss(session.position_secs()), total),
    }
}

fn status_text(app: &App, session: &PlaybackSession) -> String {
    let mut parts: Vec<String> = Vec::new();

    match app.active_source() {
        Some(source) => parts.push(format!(" SOURCE: {}", source.name)),
        None => parts.push(" SOURCE: (none)".to_string()),
    }

    if app.loading {
        parts.push("Resolving…".to_string());
    }

    match session.state() {
        SessionState::Idle => parts.push("Stopped".to_string()),
        SessionState::Loading => parts.push("Loading…".to_string()),
        SessionState::Playing | SessionState::Paused => {
            let title = session.now_playing().unwrap_or("(NA)");
            parts.push(format!("Song: {title}"));
            parts.push(
                if session.state() == SessionState::Playing {
                    "Playing"
                } else {
                    "Paused"
                }
                .to_string(),
            );
        }
    }

    let q = app.filter_query.trim();
    if app.filter_mode || !q.is_empty() {
        let mut filter_part = String::from("FILTER:");
        if !q.is_empty() {
            filter_part.push(' ');
            filter_part.push_str(q);
        }
        parts.push(filter_part);
    }

    parts.push(format!("Vol: {}", session.volume()));

    if let Some(notice) = &app.notice {
        parts.push(format!("NOTE: {notice}"));
    }

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    session: &PlaybackSession,
    seek: &SeekSync,
    display: &[usize],
    theme: &Theme,
    ui_settings: &UiSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.accent))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(" vivace ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status = Paragraph::new(status_text(app, session))
        .block(
            Block::bordered()
                .border_style(Style::default().fg(theme.border))
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    // Main list: sources or tracks, depending on the focused pane.
    match app.pane {
        Pane::Sources => draw_sources(frame, app, theme, chunks[2]),
        Pane::Tracks => draw_tracks(frame, app, display, theme, chunks[2]),
    }

    // Lyrics line
    let lyric = session.lyric_text().unwrap_or("(LYRICS)");
    let lyric_par = Paragraph::new(lyric)
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.accent))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(" lyrics "),
        );
    frame.render_widget(lyric_par, chunks[3]);

    // Seek gauge
    let duration = session.duration_secs();
    let shown = seek.pending().unwrap_or_else(|| session.position_secs());
    let ratio = if duration > 0.0 {
        (shown / duration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(" position "),
        )
        .gauge_style(Style::default().fg(theme.accent))
        .ratio(ratio)
        .label(transport_label(session, seek));
    frame.render_widget(gauge, chunks[4]);

    // Footer
    let footer = Paragraph::new(CONTROLS)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);
}

fn draw_sources(frame: &mut Frame, app: &App, theme: &Theme, area: ratatui::layout::Rect) {
    let items: Vec<ListItem> = app
        .sources
        .iter()
        .map(|s| ListItem::new(s.name.as_str()))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(" sources "),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ratatui::widgets::ListState::default();
    if !app.sources.is_empty() {
        state.select(Some(app.selected_source));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_tracks(
    frame: &mut Frame,
    app: &App,
    display: &[usize],
    theme: &Theme,
    area: ratatui::layout::Rect,
) {
    // Center the selected item when possible by rendering a visible window;
    // building ListItems only for the window keeps large playlists cheap.
    let total = display.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
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

    let items: Vec<ListItem> = display[start..end]
        .iter()
        .map(|&i| ListItem::new(format!("{}. {}", i + 1, app.tracks[i].title)))
        .collect();

    let title = if app.loading { " tracks (resolving…) " } else { " tracks " };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(title),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ratatui::widgets::ListState::default();
    if total > 0 {
        state.select(Some(selected_pos_in_visible));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::format_mmss;

    #[test]
    fn format_mmss_pads_both_fields() {
        assert_eq!(format_mmss(0.0), "00:00");
        assert_eq!(format_mmss(65.9), "01:05");
        assert_eq!(format_mmss(600.0), "10:00");
    }

    #[test]
    fn format_mmss_clamps_negatives() {
        assert_eq!(format_mmss(-3.0), "00:00");
    }
}
