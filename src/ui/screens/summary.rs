use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate, usage_ratio};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(3)])
        .split(area);

    render_totals(f, chunks[0], app);

    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    render_budgets(f, lower[0], app);
    render_spending(f, lower[1], app);
}

fn render_totals(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let values = [
        ("Today", app.totals.day),
        ("This week", app.totals.week),
        ("This month", app.totals.month),
    ];
    for (card, (title, amount)) in cards.iter().zip(values) {
        let body = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                format_amount(amount),
                theme::amount_style().add_modifier(Modifier::BOLD),
            )),
        ])
        .centered()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::OVERLAY))
                .title(Span::styled(format!(" {title} "), theme::dim_style())),
        );
        f.render_widget(body, *card);
    }
}

fn render_budgets(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            " Active budgets ",
            theme::title_style(theme::TEXT_DIM),
        ));

    if app.budget_usage.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No budget covers today", theme::dim_style())),
            Line::from(Span::styled(
                "Set one with: bookkeeper shell, then budget <amount> <from> <to>",
                theme::dim_style(),
            )),
        ])
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let items: Vec<ListItem> = app
        .budget_usage
        .iter()
        .map(|usage| {
            let ratio = usage_ratio(usage.spent, usage.budget.amount);
            let color = if ratio > 0.9 {
                theme::RED
            } else if ratio > 0.7 {
                theme::YELLOW
            } else {
                theme::GREEN
            };
            ListItem::new(vec![
                Line::from(Span::styled(
                    format!("{} .. {}", usage.budget.start_date, usage.budget.end_date),
                    theme::normal_style(),
                )),
                Line::from(vec![
                    Span::styled(
                        format!(
                            "{}/{} ",
                            format_amount(usage.spent),
                            format_amount(usage.budget.amount)
                        ),
                        Style::default().fg(color),
                    ),
                    Span::styled(create_progress_bar(ratio, 20), Style::default().fg(color)),
                    Span::styled(
                        format!(" {:.0}%", ratio * 100.0),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                ]),
            ])
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn render_spending(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .spending_by_category
        .iter()
        .take(area.height.saturating_sub(2) as usize)
        .enumerate()
        .map(|(i, (name, amount))| {
            let style = if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<20}", truncate(name, 19)), style),
                Span::styled(format!("{:>14}", format_amount(*amount)), theme::amount_style()),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                " This month by category ",
                theme::title_style(theme::TEXT_DIM),
            )),
    );
    f.render_widget(list, area);
}

fn create_progress_bar(ratio: f64, width: usize) -> String {
    let filled = (ratio * width as f64) as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}
