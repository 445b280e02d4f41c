use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::ledger::Ledger;
use crate::repository::Store;
use crate::ui::app::{App, FormField, InputMode, Screen};
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(store: &Store) -> Result<()> {
    let mut ledger = Ledger::on_store(store);
    let mut app = App::new();
    app.refresh_all(&ledger)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &mut ledger);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = %e, "form surface stopped");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    ledger: &mut Ledger<'_>,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            let content_height = f.area().height.saturating_sub(6) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                handle_key(key, app, ledger)?;
            }
        }
    }
    Ok(())
}

pub(crate) fn handle_key(key: KeyEvent, app: &mut App, ledger: &mut Ledger<'_>) -> Result<()> {
    if app.show_help {
        app.show_help = false;
        return Ok(());
    }
    match app.input_mode {
        InputMode::Normal => handle_normal_input(key, app, ledger),
        InputMode::Editing => handle_editing_input(key, app, ledger),
        InputMode::Confirm => handle_confirm_input(key, app, ledger),
    }
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: KeyEvent, app: &mut App, ledger: &mut Ledger<'_>) -> Result<()> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('1') => switch_screen(app, ledger, Screen::Expenses)?,
        KeyCode::Char('2') => switch_screen(app, ledger, Screen::Summary)?,
        KeyCode::Char('3') => switch_screen(app, ledger, Screen::Categories)?,
        KeyCode::Tab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let next = (idx + 1) % screens.len();
            switch_screen(app, ledger, screens[next])?;
        }
        KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let prev = if idx == 0 { screens.len() - 1 } else { idx - 1 };
            switch_screen(app, ledger, screens[prev])?;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_up(app);
            }
        }
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app),
        KeyCode::Char('a') => app.open_form(),
        KeyCode::Char('D') | KeyCode::Delete if app.screen == Screen::Expenses => {
            app.request_delete();
        }
        KeyCode::Char('r') => {
            app.refresh_all(ledger)?;
            app.set_status("Reloaded");
        }
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Esc => app.set_status(""),
        _ => {}
    }
    Ok(())
}

fn handle_editing_input(key: KeyEvent, app: &mut App, ledger: &mut Ledger<'_>) -> Result<()> {
    match key.code {
        KeyCode::Enter => app.submit_form(ledger)?,
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.set_status("Entry cancelled");
        }
        KeyCode::Tab | KeyCode::Down => app.form.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.form.prev_field(),
        KeyCode::Right if app.form.field == FormField::Category => app.cycle_form_category(1),
        KeyCode::Left if app.form.field == FormField::Category => app.cycle_form_category(-1),
        KeyCode::Backspace => {
            app.form.current_mut().pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.form.current_mut().clear();
        }
        KeyCode::Char(c) => app.form.current_mut().push(c),
        _ => {}
    }
    Ok(())
}

fn handle_confirm_input(key: KeyEvent, app: &mut App, ledger: &mut Ledger<'_>) -> Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm(ledger)?,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_confirm(),
        _ => {}
    }
    Ok(())
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, ledger: &Ledger<'_>, screen: Screen) -> Result<()> {
    app.screen = screen;
    match screen {
        Screen::Expenses => app.refresh_expenses(ledger)?,
        Screen::Summary => app.refresh_summary(ledger)?,
        Screen::Categories => app.refresh_categories(ledger)?,
    }
    app.set_status(format!("{screen}"));
    Ok(())
}

fn handle_move_down(app: &mut App) {
    let page = app.visible_rows;
    match app.screen {
        Screen::Expenses => scroll_down(
            &mut app.expense_index,
            &mut app.expense_scroll,
            app.expenses.len(),
            page,
        ),
        Screen::Categories => scroll_down(
            &mut app.category_index,
            &mut app.category_scroll,
            app.category_tree.len(),
            page,
        ),
        Screen::Summary => {}
    }
}

fn handle_move_up(app: &mut App) {
    match app.screen {
        Screen::Expenses => scroll_up(&mut app.expense_index, &mut app.expense_scroll),
        Screen::Categories => scroll_up(&mut app.category_index, &mut app.category_scroll),
        Screen::Summary => {}
    }
}

fn handle_goto_top(app: &mut App) {
    match app.screen {
        Screen::Expenses => scroll_to_top(&mut app.expense_index, &mut app.expense_scroll),
        Screen::Categories => scroll_to_top(&mut app.category_index, &mut app.category_scroll),
        Screen::Summary => {}
    }
}

fn handle_goto_bottom(app: &mut App) {
    let page = app.visible_rows;
    match app.screen {
        Screen::Expenses => scroll_to_bottom(
            &mut app.expense_index,
            &mut app.expense_scroll,
            app.expenses.len(),
            page,
        ),
        Screen::Categories => scroll_to_bottom(
            &mut app.category_index,
            &mut app.category_scroll,
            app.category_tree.len(),
            page,
        ),
        Screen::Summary => {}
    }
}

#[cfg(test)]
#[path = "tui_tests.rs"]
mod tui_tests;
