//! Detail panel widget for showing field/value pairs.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub struct DetailPanel<'a> {
    pub title: &'a str,
    pub fields: Vec<(&'a str, String)>,
    pub style: Style,
    /// Index of the highlighted field, if any.
    pub highlight: Option<usize>,
    pub highlight_style: Style,
}

impl<'a> DetailPanel<'a> {
    pub fn new(title: &'a str, fields: Vec<(&'a str, String)>, style: Style) -> Self {
        Self {
            title,
            fields,
            style,
            highlight: None,
            highlight_style: style,
        }
    }

    pub fn with_highlight(mut self, index: usize, style: Style) -> Self {
        self.highlight = Some(index);
        self.highlight_style = style;
        self
    }

    /// Fields with empty values are dropped unless a row is highlighted,
    /// where every row stays so the highlight index lines up.
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let lines: Vec<Line> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, (_, value))| self.highlight.is_some() || !value.trim().is_empty())
            .map(|(index, (label, value))| {
                let label_style = if self.highlight == Some(index) {
                    self.highlight_style
                } else {
                    self.style
                };
                let marker = if self.highlight == Some(index) { "> " } else { "" };
                Line::from(vec![
                    Span::styled(format!("{}{}: ", marker, label), label_style),
                    Span::raw(value.clone()),
                ])
            })
            .collect();

        let widget = Paragraph::new(Text::from(lines))
            .block(Block::default().title(self.title).borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(widget, area);
    }
}
