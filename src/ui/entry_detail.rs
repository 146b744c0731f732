use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::types::{display_name, format_badge, PokemonDetail};

use super::type_spans;

/// Base stats are drawn against this ceiling
const STAT_MAX: u32 = 255;
const BAR_WIDTH: usize = 30;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(detail) = &app.current else {
        let block = Block::default().borders(Borders::ALL).title("Entry");
        let empty = Paragraph::new("No entry selected")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    render_header(frame, detail, chunks[0]);
    render_body(frame, app, detail, chunks[1]);
}

fn render_header(frame: &mut Frame, detail: &PokemonDetail, area: Rect) {
    let mut type_line = vec![Span::styled("Type: ", Style::default().fg(Color::Gray))];
    type_line.extend(type_spans(&detail.types));

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{} ", format_badge(detail.id)),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                display_name(&detail.name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(type_line),
        Line::from(vec![
            Span::styled("Height: ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{:.1}m", detail.height_m())),
            Span::raw(" | "),
            Span::styled("Weight: ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{:.1}kg", detail.weight_kg())),
        ]),
        Line::from(vec![
            Span::styled("Artwork: ", Style::default().fg(Color::Gray)),
            Span::styled(
                detail.image_url().unwrap_or("none").to_string(),
                Style::default().fg(Color::Cyan),
            ),
        ]),
    ];

    let header =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Details"));

    frame.render_widget(header, area);
}

fn stat_bar(base: u32) -> String {
    let filled = (base.min(STAT_MAX) as usize * BAR_WIDTH) / STAT_MAX as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn stat_color(base: u32) -> Color {
    match base {
        0..=49 => Color::Red,
        50..=79 => Color::Yellow,
        80..=109 => Color::Green,
        _ => Color::Cyan,
    }
}

fn body_lines(detail: &PokemonDetail) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "Abilities",
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    if detail.abilities.is_empty() {
        lines.push(Line::from(Span::styled(
            "  none",
            Style::default().fg(Color::Gray),
        )));
    }
    for ability in &detail.abilities {
        let mut spans = vec![Span::raw(format!("  {}", display_name(&ability.name)))];
        if ability.hidden {
            spans.push(Span::styled(
                " (Hidden)",
                Style::default().fg(Color::Magenta),
            ));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Base Stats",
        Style::default().add_modifier(Modifier::BOLD),
    )));

    for stat in &detail.stats {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<16}", display_name(&stat.name)),
                Style::default().fg(Color::Gray),
            ),
            Span::raw(format!("{:>4} ", stat.base)),
            Span::styled(stat_bar(stat.base), Style::default().fg(stat_color(stat.base))),
        ]));
    }

    if !detail.stats.is_empty() {
        let total: u32 = detail.stats.iter().map(|s| s.base).sum();
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<16}", "Total"),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("{:>4}", total)),
        ]));
    }

    lines
}

fn render_body(frame: &mut Frame, app: &App, detail: &PokemonDetail, area: Rect) {
    let lines = body_lines(detail);

    let inner_height = area.height.saturating_sub(2) as usize;

    let max_scroll = lines.len().saturating_sub(inner_height);
    let scroll_offset = app.scroll_offset.min(max_scroll);

    let visible_lines: Vec<Line> = lines
        .into_iter()
        .skip(scroll_offset)
        .take(inner_height)
        .collect();

    frame.render_widget(Clear, area);

    let body = Paragraph::new(Text::from(visible_lines))
        .block(Block::default().borders(Borders::ALL).title("Profile"));

    frame.render_widget(body, area);
}
