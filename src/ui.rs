//! UI rendering for the terminal player widget.
//!
//! The layout follows the card it imitates: a header row with the label and
//! the two buttons, title and artist, album art next to the waveform, the
//! metadata grid and a controls footer.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::config::{UiSettings, VisualizationSettings};
use crate::player::{Lifecycle, TransportStatus};
use crate::track::format_duration;
use crate::visual::VisualizationBackend;

const CONTROLS: [(&str, &str); 4] = [
    ("space/p", "play/pause"),
    ("s/f", "favorite"),
    ("r", "reload track"),
    ("q", "quit"),
];

const ART_WIDTH: u16 = 24;
const BUTTONS_WIDTH: u16 = 16;
const DISABLED: Color = Color::DarkGray;

fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Text for the Length cell: the measured duration once known, the
/// descriptor's own length if loading failed, the placeholder otherwise.
pub fn length_text<B: VisualizationBackend>(app: &App<B>, ui: &UiSettings) -> String {
    let player = &app.player;
    if let Some(secs) = player.playback().duration_secs {
        return format_duration(secs);
    }
    if player.lifecycle() == Lifecycle::Failed {
        let length = player.track().length.trim();
        return if length.is_empty() {
            "-".to_string()
        } else {
            length.to_string()
        };
    }
    ui.loading_text.clone()
}

fn header_line<B: VisualizationBackend>(
    app: &App<B>,
    ui: &UiSettings,
) -> (Line<'static>, Line<'static>) {
    let player = &app.player;
    let label = Line::from(Span::styled(
        ui.header_text.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ));

    let star = if player.is_starred() {
        Span::styled(" ★ ", Style::default().fg(Color::Yellow))
    } else {
        Span::raw(" ☆ ")
    };

    let play_label = match player.status() {
        TransportStatus::Playing => " ❚❚ Pause ",
        _ => " ▶ Play ",
    };
    let play_style = if player.playback().error.is_some() {
        Style::default().fg(DISABLED)
    } else if player.lifecycle().controls_enabled() {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let buttons = Line::from(vec![
        star,
        Span::raw(" "),
        Span::styled(play_label, play_style),
    ])
    .alignment(Alignment::Right);
    (label, buttons)
}

fn draw_header<B: VisualizationBackend>(
    frame: &mut Frame,
    app: &App<B>,
    ui: &UiSettings,
    area: Rect,
) {
    let block = Block::default().borders(Borders::ALL).title(" spindle ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(BUTTONS_WIDTH)])
        .split(inner);
    let (label, buttons) = header_line(app, ui);
    frame.render_widget(Paragraph::new(label), halves[0]);
    frame.render_widget(Paragraph::new(buttons), halves[1]);
}

fn draw_title<B: VisualizationBackend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let track = app.player.track();
    let lines = vec![
        Line::from(Span::styled(
            track.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Artist: {}", track.artist)),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().padding(Padding::horizontal(1))),
        area,
    );
}

fn draw_art<B: VisualizationBackend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let art = app.player.track().album_art_url.trim();
    let text = if art.is_empty() {
        "no album art".to_string()
    } else {
        std::path::Path::new(art)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(art)
            .to_string()
    };
    let block = Block::default().borders(Borders::ALL).title(" art ");
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        area,
    );
}

/// Elapsed and total time for the waveform title, once the track is ready.
fn position_text<B: VisualizationBackend>(app: &App<B>) -> Option<String> {
    let playback = app.player.playback();
    if app.player.lifecycle() != Lifecycle::Ready {
        return None;
    }
    let total = playback.duration_secs?;
    Some(format!(
        " {} / {} ",
        format_duration(playback.position_secs),
        format_duration(total)
    ))
}

fn draw_waveform<B: VisualizationBackend>(frame: &mut Frame, app: &App<B>, area: Rect) {
    let mut block = Block::default().borders(Borders::ALL).title(" waveform ");
    if let Some(position) = position_text(app) {
        block = block.title(Line::from(position).alignment(Alignment::Right));
    }
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(error) = &app.player.playback().error {
        let lines = vec![
            Line::from("Error!".bold().fg(Color::Red)),
            Line::from(error.user_message()),
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
        return;
    }

    app.player.render_waveform(inner, frame.buffer_mut());
}

fn draw_grid<B: VisualizationBackend>(
    frame: &mut Frame,
    app: &App<B>,
    ui: &UiSettings,
    area: Rect,
) {
    let fields = app.player.track().grid_fields();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7])
        .split(area);

    for (i, ((label, value), column)) in fields.iter().zip(columns.iter()).enumerate() {
        let value = if i == 0 {
            length_text(app, ui)
        } else {
            value.to_string()
        };
        let lines = vec![
            Line::from(Span::styled(*label, Style::default().fg(DISABLED))),
            Line::from(value),
        ];
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(Block::default().padding(Padding::horizontal(1))),
            *column,
        );
    }
}

/// Render the entire widget into `frame`.
pub fn draw<B: VisualizationBackend>(
    frame: &mut Frame,
    app: &App<B>,
    ui: &UiSettings,
    visual: &VisualizationSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Length(visual.height.saturating_add(2).max(5)),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, app, ui, chunks[0]);
    draw_title(frame, app, chunks[1]);

    let media = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(ART_WIDTH), Constraint::Min(1)])
        .split(chunks[2]);
    draw_art(frame, app, media[0]);
    draw_waveform(frame, app, media[1]);

    draw_grid(frame, app, ui, chunks[3]);

    let mut footer_text = controls_text();
    if let Some(notice) = &app.notice {
        footer_text.push_str(" • ");
        footer_text.push_str(notice);
    }
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
    frame.render_widget(footer, chunks[5]);
}
