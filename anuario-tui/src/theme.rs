//! Hogwarts theme and color utilities.

use anuario_core::STATUS_DECEASED;
use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct HogwartsTheme {
    pub bg: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focus: Color,
    pub gryffindor: Color,
    pub slytherin: Color,
    pub ravenclaw: Color,
    pub hufflepuff: Color,
}

impl HogwartsTheme {
    pub fn hogwarts() -> Self {
        Self {
            bg: Color::Rgb(14, 11, 8),
            bg_highlight: Color::Rgb(48, 38, 26),
            primary: Color::Rgb(211, 166, 37),
            secondary: Color::Rgb(174, 138, 90),
            success: Color::Rgb(90, 170, 90),
            warning: Color::Rgb(236, 185, 57),
            error: Color::Rgb(200, 60, 50),
            info: Color::Rgb(120, 160, 210),
            text: Color::Rgb(238, 225, 198),
            text_dim: Color::Rgb(140, 128, 108),
            border: Color::Rgb(92, 74, 50),
            border_focus: Color::Rgb(211, 166, 37),
            gryffindor: Color::Rgb(174, 0, 1),
            slytherin: Color::Rgb(26, 120, 60),
            ravenclaw: Color::Rgb(34, 47, 91),
            hufflepuff: Color::Rgb(236, 185, 57),
        }
    }
}

/// Color for a house label. Combined values take the first house named.
pub fn house_color(house: &str, theme: &HogwartsTheme) -> Color {
    let house = house.to_lowercase();
    [
        ("gryffindor", theme.gryffindor),
        ("slytherin", theme.slytherin),
        ("ravenclaw", theme.ravenclaw),
        ("hufflepuff", theme.hufflepuff),
    ]
    .into_iter()
    .filter_map(|(name, color)| house.find(name).map(|pos| (pos, color)))
    .min_by_key(|(pos, _)| *pos)
    .map(|(_, color)| color)
    .unwrap_or(theme.text_dim)
}

pub fn status_color(status: &str, theme: &HogwartsTheme) -> Color {
    if status.trim().eq_ignore_ascii_case(STATUS_DECEASED) {
        theme.text_dim
    } else {
        theme.success
    }
}

pub fn progress_color(current: u64, total: u64, theme: &HogwartsTheme) -> Color {
    if total == 0 || current >= total {
        theme.success
    } else {
        theme.warning
    }
}
