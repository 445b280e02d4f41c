use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .category_tree
        .iter()
        .enumerate()
        .skip(app.category_scroll)
        .take(area.height.saturating_sub(2) as usize)
        .map(|(i, (depth, cat))| {
            let prefix = if *depth == 0 {
                String::new()
            } else {
                format!("{}└ ", "  ".repeat(*depth))
            };
            let style = if i == app.category_index {
                theme::selected_style()
            } else if *depth == 0 {
                theme::title_style(theme::ACCENT)
            } else {
                theme::normal_style()
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{prefix}{}", cat.name), style),
                Span::styled(format!("  #{}", cat.pk.unwrap_or(0)), theme::dim_style()),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .title(Span::styled(
                format!(" Categories ({}) | a add expense here ", app.category_tree.len()),
                theme::title_style(theme::ACCENT),
            )),
    );
    f.render_widget(list, area);
}
