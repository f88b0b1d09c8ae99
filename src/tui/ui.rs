use crate::tui::app::{App, Mode};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Query input
            Constraint::Min(10),   // Results / details
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    draw_query_input(f, app, chunks[0]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    draw_results_list(f, app, main[0]);
    draw_details(f, app, main[1]);

    draw_status_bar(f, app, chunks[2]);

    if app.mode == Mode::Help {
        draw_help(f, chunks[1]);
    }
}

fn draw_query_input(f: &mut Frame, app: &App, area: Rect) {
    let input = Paragraph::new(app.query.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search (F1: help, Esc: clear/quit) "),
        );

    f.render_widget(input, area);

    if app.mode == Mode::Search {
        let offset = app.query.chars().count() as u16;
        f.set_cursor_position((area.x + offset + 1, area.y + 1));
    }
}

fn draw_results_list(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .results
        .iter()
        .map(|hit| {
            let line = Line::from(vec![
                Span::styled(format!("{:>4} ", hit.score), Style::default().fg(Color::Yellow)),
                Span::raw(hit.title.clone()),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Results ({}) ", app.results.len())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !app.results.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_details(f: &mut Frame, app: &App, area: Rect) {
    let content = match app.selected_hit() {
        Some(hit) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    hit.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(hit.link(), Style::default().fg(Color::Blue))),
                Line::from(Span::styled(
                    hit.filename.clone(),
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            if let Some(description) = &hit.description {
                lines.push(Line::from(Span::styled(
                    description.clone(),
                    Style::default().fg(Color::Cyan),
                )));
            }
            if let Some(summary) = &hit.summary {
                lines.push(Line::raw(""));
                lines.push(Line::raw(summary.clone()));
            }
            Text::from(lines)
        }
        None => Text::raw("No result selected"),
    };

    let details = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title(" Details "))
        .wrap(Wrap { trim: true });

    f.render_widget(details, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status = Paragraph::new(app.status_message.as_str())
        .style(Style::default().fg(Color::Cyan));

    f.render_widget(status, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let text = Text::from(vec![
        Line::raw("Type to search. Prefix a word with - to exclude it."),
        Line::raw(""),
        Line::raw("Up / Ctrl+k       previous result"),
        Line::raw("Down / Ctrl+j     next result"),
        Line::raw("PageUp / PageDown move by a page"),
        Line::raw("Ctrl+w            delete word"),
        Line::raw("Esc               clear query, quit when empty"),
        Line::raw("Ctrl+c            quit"),
    ]);
    let width = area.width.min(56);
    let height = area.height.min(12);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(" Help ")),
        popup,
    );
}
