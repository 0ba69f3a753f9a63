//! Status indicator widget.

use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Single-line status with an optional right-hand detail, e.g. the
/// connection state next to the logged-in user.
pub struct StatusIndicator {
    pub title: String,
    pub status: String,
    pub detail: Option<String>,
    pub style: Style,
    pub detail_style: Style,
}

impl StatusIndicator {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let mut spans = vec![Span::styled(self.status.clone(), self.style)];
        if let Some(detail) = &self.detail {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(detail.clone(), self.detail_style));
        }
        let paragraph = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Left)
            .block(
                Block::default()
                    .title(self.title.as_str())
                    .borders(Borders::ALL),
            );
        f.render_widget(paragraph, area);
    }
}
