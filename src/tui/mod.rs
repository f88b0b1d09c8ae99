mod app;
mod ui;

pub use app::App;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

pub fn run(mut app: App, initial_query: Option<String>) -> Result<()> {
    if let Some(query) = initial_query {
        app.set_query(&query);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        // Only key presses; Windows also reports releases
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let (KeyModifiers::CONTROL, KeyCode::Char('c')) = (key.modifiers, key.code) {
            return Ok(());
        }

        if app.mode == app::Mode::Help {
            app.hide_help();
            continue;
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('j'))
            | (KeyModifiers::CONTROL, KeyCode::Char('n')) => app.select_next(),
            (KeyModifiers::CONTROL, KeyCode::Char('k'))
            | (KeyModifiers::CONTROL, KeyCode::Char('p')) => app.select_prev(),
            (KeyModifiers::CONTROL, KeyCode::Char('w')) => app.delete_word(),
            (KeyModifiers::CONTROL, KeyCode::Char('h')) => app.pop_char(),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, code) => match code {
                KeyCode::Esc => {
                    if app.query.is_empty() {
                        return Ok(());
                    }
                    app.clear_query();
                }
                KeyCode::Down | KeyCode::Tab => app.select_next(),
                KeyCode::Up | KeyCode::BackTab => app.select_prev(),
                KeyCode::PageDown => app.select_page_down(),
                KeyCode::PageUp => app.select_page_up(),
                KeyCode::F(1) => app.show_help(),
                KeyCode::Char(c) => app.push_char(c),
                KeyCode::Backspace => app.pop_char(),
                _ => {}
            },
            _ => {}
        }
    }
}
