//! Create/edit form.

use crate::state::{App, EditorField};
use crate::widgets::DetailPanel;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let editor = &app.editor;
    let title = match &editor.target_id {
        Some(id) => format!("Edit character #{}", id),
        None => "New character".to_string(),
    };
    let fields: Vec<(&str, String)> = EditorField::ALL
        .iter()
        .map(|field| (field.label(), field.value(&editor.draft).to_string()))
        .collect();

    DetailPanel::new(&title, fields, Style::default().fg(app.theme.secondary))
        .with_highlight(
            editor.field,
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        )
        .render(f, rows[0]);

    let hint = if editor.saving {
        "Saving...".to_string()
    } else {
        format!(
            "{}: list fields take comma separated values",
            editor.current_field().label()
        )
    };
    let footer = Paragraph::new(hint)
        .style(Style::default().fg(app.theme.text_dim))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, rows[1]);
}
