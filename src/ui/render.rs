use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use super::app::{App, FormField, InputMode, Screen};
use super::theme;

pub(crate) fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Message bar
        ])
        .split(f.area());

    render_tab_bar(f, chunks[0], app);
    render_screen(f, chunks[1], app);
    render_status_bar(f, chunks[2], app);
    render_message_bar(f, chunks[3], app);

    if app.input_mode == InputMode::Editing {
        render_form(f, f.area(), app);
    }
    if app.show_help {
        render_help_overlay(f, f.area());
    }
}

fn render_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Screen::all()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let num = format!("{}", i + 1);
            if *s == app.screen {
                Line::from(vec![
                    Span::styled(format!("{num}:"), Style::default().fg(theme::TEXT_DIM)),
                    Span::styled(
                        format!("{s}"),
                        theme::title_style(theme::ACCENT),
                    ),
                ])
            } else {
                Line::from(Span::styled(
                    format!("{num}:{s}"),
                    Style::default().fg(theme::TEXT_DIM),
                ))
            }
        })
        .collect();

    let tabs = Tabs::new(titles)
        .divider(Span::styled(" | ", Style::default().fg(theme::OVERLAY)))
        .style(Style::default().bg(theme::HEADER_BG));

    f.render_widget(tabs, area);
}

fn render_screen(f: &mut Frame, area: Rect, app: &App) {
    match app.screen {
        Screen::Expenses => super::screens::expenses::render(f, area, app),
        Screen::Summary => super::screens::summary::render(f, area, app),
        Screen::Categories => super::screens::categories::render(f, area, app),
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mode_label = format!(" {} ", app.input_mode);
    let mode_color = match app.input_mode {
        InputMode::Normal => theme::ACCENT,
        InputMode::Editing => theme::GREEN,
        InputMode::Confirm => theme::RED,
    };
    let mode_style = theme::mode_style(mode_color);

    let info = format!(" {} | {} expenses", app.screen, app.expenses.len());

    let right = match (app.input_mode, app.screen) {
        (InputMode::Editing, _) => " Tab next field | ←/→ category | Enter save | Esc cancel ",
        (_, Screen::Expenses) => " a add | D delete | ? help ",
        (_, Screen::Summary) => " a add | r refresh | ? help ",
        (_, Screen::Categories) => " a add here | ? help ",
    };

    let available = area.width as usize;
    let used = mode_label.chars().count() + info.chars().count() + right.chars().count();
    let pad = available.saturating_sub(used);

    let bar = Paragraph::new(Line::from(vec![
        Span::styled(&mode_label, mode_style),
        Span::styled(&info, theme::status_bar_style()),
        Span::styled(" ".repeat(pad), theme::status_bar_style()),
        Span::styled(right, theme::status_bar_style()),
    ]));
    f.render_widget(bar, area);
}

fn render_message_bar(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Confirm => Line::from(vec![
            Span::styled(&app.confirm_message, Style::default().fg(theme::YELLOW)),
            Span::styled(" [y/N] ", Style::default().fg(theme::RED)),
        ]),
        _ if app.status_message.is_empty() => Line::from(Span::styled(
            " Press a to add an expense, ? for help",
            theme::dim_style(),
        )),
        _ => Line::from(Span::styled(&app.status_message, theme::command_bar_style())),
    };

    let bar = Paragraph::new(content).style(Style::default().bg(theme::COMMAND_BG));
    f.render_widget(bar, area);
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let popup_height = (FormField::all().len() as u16 * 2 + 3).min(area.height);
    let popup_width = 56.min(area.width.saturating_sub(4));
    let popup_area = centered(area, popup_width, popup_height);

    let mut lines = vec![Line::from("")];
    let mut cursor = None;
    for (row, field) in FormField::all().iter().enumerate() {
        let active = *field == app.form.field;
        let label_style = if active {
            theme::title_style(theme::ACCENT)
        } else {
            theme::dim_style()
        };
        let label = format!(" {:<10}", field.label());
        let value = app.form.value(*field);
        if active {
            let x = popup_area.x + 1 + label.chars().count() as u16 + value.chars().count() as u16;
            let y = popup_area.y + 2 + row as u16 * 2;
            cursor = Some((x.min(popup_area.right().saturating_sub(2)), y));
        }
        lines.push(Line::from(vec![
            Span::styled(label, label_style),
            Span::styled(value, theme::normal_style()),
        ]));
        lines.push(Line::from(""));
    }

    f.render_widget(Clear, popup_area);
    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::GREEN))
            .title(Span::styled(
                " New expense ",
                theme::title_style(theme::GREEN),
            ))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(form, popup_area);

    if let Some(position) = cursor {
        f.set_cursor_position(position);
    }
}

fn render_help_overlay(f: &mut Frame, area: Rect) {
    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            theme::title_style(theme::YELLOW),
        ))
    };
    let row = |text: &'static str| Line::from(Span::styled(text, theme::normal_style()));

    let help_text = vec![
        Line::from(Span::styled(
            " Bookkeeper Help ",
            theme::title_style(theme::ACCENT),
        )),
        Line::from(""),
        section(" Navigation"),
        row("  j/k or Up/Down   Move cursor           1-3        Switch tabs"),
        row("  Tab/Shift-Tab    Cycle tabs            g/G        Top/Bottom"),
        row("  Ctrl-d/u         Page Down/Up          q, Ctrl-q  Quit"),
        Line::from(""),
        section(" Actions"),
        row("  a                Open expense form     r          Reload data"),
        row("  D (Expenses)     Delete expense        ?          This help"),
        Line::from(""),
        section(" Expense form"),
        row("  Tab/Shift-Tab    Next/Previous field   Enter      Save"),
        row("  Left/Right       Cycle categories      Esc        Cancel"),
        row("  Date accepts YYYY-MM-DD or YYYY-MM-DD HH:MM"),
        Line::from(""),
        Line::from(Span::styled(
            " Press any key to close ",
            Style::default().fg(theme::TEXT_DIM),
        )),
    ];

    let popup_height = (help_text.len() as u16 + 2).min(area.height.saturating_sub(2));
    let popup_width = 72.min(area.width.saturating_sub(4));
    let popup_area = centered(area, popup_width, popup_height);

    f.render_widget(Clear, popup_area);
    let help = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(help, popup_area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
