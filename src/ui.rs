//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::audio::{Backend, PlayerState};
use crate::config::{ControlsSettings, UiSettings};

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    [
        "[space/p] play/pause".to_string(),
        "[l/n] next".to_string(),
        "[h/b] previous".to_string(),
        "[r] replay".to_string(),
        format!("[H/L] scrub -/+{scrub_seconds}s"),
        "[-/+] volume".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

fn state_text(state: PlayerState) -> &'static str {
    match state {
        PlayerState::Idle => "Stopped",
        PlayerState::Loading => "Loading",
        PlayerState::Ready => "Ready",
        PlayerState::Playing => "Playing",
        PlayerState::Paused => "Paused",
    }
}

/// Played time on the left, remaining time on the right, padded to `width`.
fn time_line(played: &str, remaining: &str, width: usize) -> String {
    let gap = width.saturating_sub(played.chars().count() + remaining.chars().count());
    format!("{played}{}{remaining}", " ".repeat(gap.max(1)))
}

/// Render the entire UI into the provided `frame`.
pub fn draw<B: Backend>(
    frame: &mut Frame,
    app: &App<B>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" allegro ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Song details + played/remaining labels
    let song = app
        .now_playing()
        .unwrap_or_else(|| "Nothing loaded".to_string());
    let inner_width = chunks[1].width.saturating_sub(4) as usize;
    let details = format!(
        "{song}\n{}",
        time_line(&app.played_label(), &app.remaining_label(), inner_width)
    );
    let now_playing = Paragraph::new(details).block(
        Block::bordered()
            .padding(Padding::horizontal(1))
            .title(format!(" {} ", state_text(app.player.state()))),
    );
    frame.render_widget(now_playing, chunks[1]);

    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" progress "))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(app.progress())
        .label(app.played_label());
    frame.render_widget(progress, chunks[2]);

    let volume = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" volume "))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(app.volume.fraction())
        .label(format!("{}/{}", app.volume.value(), app.volume.max()));
    frame.render_widget(volume, chunks[3]);

    if let Some(status) = &app.status {
        let status_par = Paragraph::new(status.as_str())
            .style(Style::default().add_modifier(Modifier::BOLD))
            .block(Block::bordered().padding(Padding::horizontal(1)).title(" status "))
            .wrap(Wrap { trim: true });
        frame.render_widget(status_par, chunks[4]);
    }

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding::horizontal(1)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);
}
