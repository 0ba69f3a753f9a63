//! Catalog browser view: filter bar, current page, and a preview.

use crate::state::App;
use crate::theme::{house_color, status_color};
use crate::widgets::{DetailPanel, FilterBar, FilterOption};
use anuario_core::{HouseFilter, StatusFilter};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    render_filters(f, app, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    let items: Vec<ListItem> = app
        .catalog
        .visible()
        .into_iter()
        .map(|character| {
            let star = if character.favorite { "★ " } else { "  " };
            let house = if character.house.trim().is_empty() {
                "-".to_string()
            } else {
                character.house.clone()
            };
            ListItem::new(Line::from(vec![
                Span::styled(star, Style::default().fg(app.theme.warning)),
                Span::styled(character.name.clone(), Style::default().fg(app.theme.text)),
                Span::raw("  "),
                Span::styled(house, Style::default().fg(house_color(&character.house, &app.theme))),
                Span::raw("  "),
                Span::styled(
                    character.status.clone(),
                    Style::default().fg(status_color(&character.status, &app.theme)),
                ),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(app.selected));
    }

    let title = format!("Characters ({})", app.catalog.filtered_len());
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(app.theme.bg_highlight)
                .add_modifier(Modifier::BOLD),
        );
    f.render_stateful_widget(list, columns[0], &mut state);

    let mut fields = Vec::new();
    if let Some(character) = app.selected_character() {
        fields.push(("Name", character.name.clone()));
        fields.push(("House", character.house.clone()));
        fields.push(("Status", character.status.clone()));
        fields.push(("Patronus", character.patronus.clone()));
        fields.push(("Species", character.species.clone()));
        fields.push(("Born", character.born.clone()));
        fields.push(("Died", character.died.clone()));
    }
    DetailPanel::new("Preview", fields, Style::default().fg(app.theme.secondary)).render(f, columns[1]);

    render_pager(f, app, rows[2]);
}

fn render_filters(f: &mut Frame<'_>, app: &App, area: Rect) {
    let criteria = app.catalog.criteria();
    let text = criteria.text.trim();
    let patronus = criteria.patronus.trim();
    let filters = [
        FilterOption::new(
            '/',
            if text.is_empty() {
                "Name: any".to_string()
            } else {
                format!("Name: {}", text)
            },
            !text.is_empty(),
        ),
        FilterOption::new(
            'u',
            format!("House: {}", criteria.house.label()),
            criteria.house != HouseFilter::Any,
        ),
        FilterOption::new(
            's',
            format!("Status: {}", criteria.status.label()),
            criteria.status != StatusFilter::Any,
        ),
        FilterOption::new(
            'p',
            if patronus.is_empty() {
                "Patronus: any".to_string()
            } else {
                format!("Patronus: {}", patronus)
            },
            !patronus.is_empty(),
        ),
        FilterOption::new('v', "Favorites", criteria.favorites_only),
    ];

    let bar = FilterBar {
        title: if criteria.is_empty() {
            "Filters".to_string()
        } else {
            "Filters [c clear]".to_string()
        },
        filters: &filters,
        active_style: Style::default()
            .fg(app.theme.primary)
            .add_modifier(Modifier::BOLD),
        inactive_style: Style::default().fg(app.theme.text_dim),
        key_style: Style::default().fg(app.theme.secondary),
    };
    bar.render(f, area);
}

fn render_pager(f: &mut Frame<'_>, app: &App, area: Rect) {
    let enabled = Style::default().fg(app.theme.primary);
    let disabled = Style::default().fg(app.theme.text_dim);
    let line = Line::from(vec![
        Span::styled(
            "< prev ",
            if app.catalog.has_previous() { enabled } else { disabled },
        ),
        Span::styled(
            format!(
                " Page {} of {} ",
                app.catalog.current_page() + 1,
                app.catalog.page_count()
            ),
            Style::default().fg(app.theme.text),
        ),
        Span::styled(
            " next >",
            if app.catalog.has_next() { enabled } else { disabled },
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
