//! Progress gauge for the image sync.

use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Gauge},
    Frame,
};

pub struct ProgressBar {
    pub title: String,
    pub current: u64,
    pub total: u64,
    pub style: Style,
}

impl ProgressBar {
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.current as f64 / self.total as f64).clamp(0.0, 1.0)
        }
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let gauge = Gauge::default()
            .block(Block::default().title(self.title.as_str()).borders(Borders::ALL))
            .gauge_style(self.style)
            .label(format!("{}/{}", self.current, self.total))
            .ratio(self.ratio());
        f.render_widget(gauge, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(current: u64, total: u64) -> ProgressBar {
        ProgressBar {
            title: "Images".to_string(),
            current,
            total,
            style: Style::default(),
        }
    }

    #[test]
    fn test_ratio_handles_zero_total() {
        assert_eq!(bar(3, 0).ratio(), 0.0);
    }

    #[test]
    fn test_ratio_is_clamped() {
        assert_eq!(bar(12, 10).ratio(), 1.0);
        assert!((bar(5, 10).ratio() - 0.5).abs() < f64::EPSILON);
    }
}
