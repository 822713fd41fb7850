use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::config::RenamerConfig;
use crate::fs_ops::stat_paths;
use crate::probe::MediaInfoCli;
use crate::store::MoveDirection;

use super::app::App;
use super::models::Focus;
use super::rendering::ui;

pub async fn run_tui(files: Vec<PathBuf>, config: RenamerConfig, probe: MediaInfoCli) -> Result<()> {
    if !probe.is_available() {
        tracing::warn!(binary = %probe.binary().display(), "mediainfo not found, analysis disabled");
    }
    let entries = stat_paths(files).await;
    let mut app = App::with_selected_files(entries, config, Arc::new(probe));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        tracing::error!(error = %err, "terminal loop failed");
    }
    res
}

async fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.clear_status_message_if_expired();
        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key).await;
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

pub(crate) async fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('q') | KeyCode::F(1)) {
            app.toggle_help();
        }
        return;
    }

    match app.focus {
        Focus::Files => handle_list_key(app, key).await,
        Focus::Form => handle_form_key(app, key),
    }
}

async fn handle_list_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('h') | KeyCode::F(1) => app.toggle_help(),
        KeyCode::Char('p') => app.toggle_preview(),
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Down | KeyCode::Char('j') => app.next(),
        KeyCode::Up | KeyCode::Char('k') => app.previous(),
        KeyCode::Char('J') => app.move_highlighted(MoveDirection::Down),
        KeyCode::Char('K') => app.move_highlighted(MoveDirection::Up),
        KeyCode::Char(' ') => app.toggle_highlighted_selection(),
        KeyCode::Char('a') => app.toggle_select_all(),
        KeyCode::Char('d') | KeyCode::Delete => app.remove_highlighted(),
        KeyCode::Char('c') => app.clear_files(),
        KeyCode::Char('i') => app.analyze_highlighted().await,
        KeyCode::Char('e') => app.apply_form_to_highlighted(),
        KeyCode::Char('o') => app.load_form_from_highlighted(),
        KeyCode::Enter | KeyCode::Char('r') => app.process_files().await,
        KeyCode::Char('u') => app.undo_renames().await,
        _ => {}
    }
}

fn handle_form_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Tab => app.toggle_focus(),
        KeyCode::Down => app.next_form_field(),
        KeyCode::Up | KeyCode::BackTab => app.previous_form_field(),
        KeyCode::Left => app.cycle_form_value(false),
        KeyCode::Right => app.cycle_form_value(true),
        KeyCode::Enter => app.apply_form_to_all(),
        KeyCode::Backspace => app.form_backspace(),
        KeyCode::Char(c) => app.form_input(c),
        _ => {}
    }
}
