use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::Frame;

use crate::app::App;
use crate::pager::PagerState;
use crate::types::{display_name, format_badge};

use super::type_spans;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let entries = app.entries();
    let name_width = 24;

    let mut items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let style = if i == app.selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let name = display_name(&entry.name);
            let name_display = if name.chars().count() > name_width {
                let cut: String = name.chars().take(name_width - 3).collect();
                format!("{}...", cut)
            } else {
                name
            };

            let mut spans = vec![
                Span::styled(
                    format!("{:>5}", format_badge(entry.id)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw("  "),
                Span::styled(format!("{:<name_width$}", name_display), style),
                Span::raw("  "),
            ];
            spans.extend(type_spans(&entry.types));

            ListItem::new(Line::from(spans))
        })
        .collect();

    items.push(ListItem::new(sentinel_line(app)));

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Pokémon ({})", entries.len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default()
        .with_offset(app.viewport.offset)
        .with_selected((!entries.is_empty()).then_some(app.selected));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Row after the last entry; its visibility drives paging.
fn sentinel_line(app: &App) -> Line<'_> {
    match app.pager.state() {
        PagerState::Loading => Line::from(Span::styled(
            "  Loading more Pokémon...",
            Style::default().fg(Color::Yellow),
        )),
        PagerState::Exhausted => Line::from(Span::styled(
            "  All Pokémon loaded! You've caught 'em all",
            Style::default().fg(Color::Green),
        )),
        PagerState::Idle => match app.pager.last_error() {
            Some(err) => Line::from(vec![
                Span::styled(
                    format!("  Failed to load more: {}", err),
                    Style::default().fg(Color::Red),
                ),
                Span::styled("  (r: retry)", Style::default().fg(Color::Gray)),
            ]),
            None => Line::from(Span::styled("  ...", Style::default().fg(Color::DarkGray))),
        },
    }
}
