mod entry_detail;
mod entry_list;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, Screen};
use crate::pager::PagerState;
use crate::types::{display_name, format_badge};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match app.screen {
        Screen::List => entry_list::render(frame, app, chunks[1]),
        Screen::Detail => entry_detail::render(frame, app, chunks[1]),
    }

    render_status_bar(frame, app, chunks[2]);
}

/// Badge color per elemental type
pub fn type_color(name: &str) -> Color {
    match name {
        "normal" => Color::Gray,
        "fire" => Color::Rgb(240, 128, 48),
        "water" => Color::Rgb(104, 144, 240),
        "electric" => Color::Rgb(248, 208, 48),
        "grass" => Color::Rgb(120, 200, 80),
        "ice" => Color::Rgb(152, 216, 216),
        "fighting" => Color::Rgb(192, 48, 40),
        "poison" => Color::Rgb(160, 64, 160),
        "ground" => Color::Rgb(224, 192, 104),
        "flying" => Color::Rgb(168, 144, 240),
        "psychic" => Color::Rgb(248, 88, 136),
        "bug" => Color::Rgb(168, 184, 32),
        "rock" => Color::Rgb(184, 160, 56),
        "ghost" => Color::Rgb(112, 88, 152),
        "dragon" => Color::Rgb(112, 56, 248),
        "dark" => Color::Rgb(112, 88, 72),
        "steel" => Color::Rgb(184, 184, 208),
        "fairy" => Color::Rgb(238, 153, 172),
        _ => Color::Gray,
    }
}

/// One colored span per type, separated by spaces
pub fn type_spans(types: &[String]) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(types.len() * 2);
    for (i, t) in types.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            display_name(t),
            Style::default()
                .fg(Color::Black)
                .bg(type_color(t))
                .add_modifier(Modifier::BOLD),
        ));
    }
    spans
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.screen {
        Screen::List => format!("Pokédex - {} loaded", app.entries().len()),
        Screen::Detail => {
            if let Some(detail) = &app.current {
                format!(
                    "Pokédex - {} {}",
                    format_badge(detail.id),
                    display_name(&detail.name)
                )
            } else {
                "Pokédex - Entry".to_string()
            }
        }
    };

    let header = Paragraph::new(Line::from(vec![Span::styled(
        title,
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )]))
    .style(Style::default().bg(Color::DarkGray));

    frame.render_widget(header, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if let Some(error) = &app.error {
        Line::from(vec![Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )])
    } else if let Some(notice) = &app.notice {
        Line::from(vec![Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Green),
        )])
    } else if app.loading_detail {
        Line::from(vec![Span::styled(
            "Loading entry... (Esc: cancel)",
            Style::default().fg(Color::Yellow),
        )])
    } else if app.screen == Screen::List && app.pager.state() == PagerState::Loading {
        Line::from(vec![Span::styled(
            "Loading more Pokémon...",
            Style::default().fg(Color::Yellow),
        )])
    } else {
        let help = match app.screen {
            Screen::List => {
                "j/k/g/G: nav | Ctrl+d/u: page | Enter: open | r: retry | R: refresh | o: artwork | y: yank | q: quit"
            }
            Screen::Detail => "j/k/g: scroll | Ctrl+d/u: page | o: artwork | y: yank | q: back",
        };
        Line::from(vec![Span::styled(help, Style::default().fg(Color::Gray))])
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}
