//! Configuration viewer.

use crate::state::App;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(5)])
        .split(area);

    let config_text = Paragraph::new(app.config_view.content.as_str())
        .block(Block::default().title("Config (password hidden)").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(config_text, chunks[0]);

    let items: Vec<ListItem> = if app.config_view.validation_errors.is_empty() {
        vec![ListItem::new("Configuration is valid").style(Style::default().fg(app.theme.success))]
    } else {
        app.config_view
            .validation_errors
            .iter()
            .map(|err| ListItem::new(err.as_str()).style(Style::default().fg(app.theme.error)))
            .collect()
    };
    let list = List::new(items).block(Block::default().title("Validation").borders(Borders::ALL));
    f.render_widget(list, chunks[1]);
}
