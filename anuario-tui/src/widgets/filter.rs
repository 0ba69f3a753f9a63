//! Filter bar widget.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// One criterion shown as `[key] label`.
#[derive(Debug, Clone)]
pub struct FilterOption {
    pub key: char,
    pub label: String,
    pub active: bool,
}

impl FilterOption {
    pub fn new(key: char, label: impl Into<String>, active: bool) -> Self {
        Self {
            key,
            label: label.into(),
            active,
        }
    }
}

pub struct FilterBar<'a> {
    pub title: String,
    pub filters: &'a [FilterOption],
    pub active_style: Style,
    pub inactive_style: Style,
    pub key_style: Style,
}

impl<'a> FilterBar<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let mut spans = Vec::with_capacity(self.filters.len() * 2);
        for filter in self.filters {
            let style = if filter.active {
                self.active_style
            } else {
                self.inactive_style
            };
            spans.push(Span::styled(format!(" [{}]", filter.key), self.key_style));
            spans.push(Span::styled(format!(" {} ", filter.label), style));
        }

        let paragraph = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .title(self.title.as_str())
                .borders(Borders::ALL),
        );
        f.render_widget(paragraph, area);
    }
}
