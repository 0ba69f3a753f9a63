//! View rendering dispatch.

pub mod catalog;
pub mod config;
pub mod detail;
pub mod editor;

use crate::nav::View;
use crate::state::{App, SyncStatus};
use crate::theme::progress_color;
use crate::widgets::{ProgressBar, StatusIndicator};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    match app.active_view {
        View::Catalog => catalog::render(f, app, layout[1]),
        View::Detail => detail::render(f, app, layout[1]),
        View::Editor => editor::render(f, app, layout[1]),
        View::ConfigViewer => config::render(f, app, layout[1]),
    }

    render_footer(f, app, layout[2]);

    if let Some(prompt) = &app.prompt {
        let area = centered(f.size(), 60, 3);
        f.render_widget(Clear, area);
        let input = Paragraph::new(format!("{}_", prompt.input)).block(
            Block::default()
                .title(prompt.title.as_str())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border_focus)),
        );
        f.render_widget(input, area);
    }

    if let Some(modal) = &app.modal {
        let area = centered(f.size(), 70, 9);
        f.render_widget(Clear, area);
        let body = Paragraph::new(modal.message.as_str())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(modal.title.as_str())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.primary)),
            );
        f.render_widget(body, area);
    }
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let titles: Vec<Line> = View::all()
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!("{} {}", i + 1, view.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.active_view.index())
        .block(Block::default().title("Anuario Hogwarts").borders(Borders::ALL))
        .style(Style::default().fg(app.theme.text_dim))
        .highlight_style(
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, chunks[0]);

    if let SyncStatus::Images { current, total } = app.sync_status {
        let bar = ProgressBar {
            title: "Image sync".to_string(),
            current,
            total,
            style: Style::default().fg(progress_color(current, total, &app.theme)),
        };
        bar.render(f, chunks[1]);
        return;
    }

    let status_style = match app.sync_status {
        SyncStatus::Online => Style::default().fg(app.theme.success),
        SyncStatus::Offline => Style::default().fg(app.theme.warning),
        SyncStatus::Failed(_) => Style::default().fg(app.theme.error),
        _ => Style::default().fg(app.theme.info),
    };
    let user = match app.session.username() {
        Some(name) if app.session.is_logged_in() => format!("User: {}", name),
        _ if app.session.is_logged_in() => "Logged in".to_string(),
        _ => "Read only".to_string(),
    };
    let indicator = StatusIndicator {
        title: "Status".to_string(),
        status: app.sync_status.label(),
        detail: Some(user),
        style: status_style,
        detail_style: Style::default().fg(app.theme.secondary),
    };
    indicator.render(f, chunks[1]);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let help = match app.active_view {
        View::Catalog => "j/k move • h/l page • Enter open • / search • u house • s status • f favorite • ? help • q quit",
        View::Detail => "e edit • d delete • f favorite • i upload image • Esc back • q quit",
        View::Editor => "j/k field • Enter edit/toggle • Ctrl+s save • Esc cancel",
        View::ConfigViewer => "Tab switch view • q quit",
    };

    let (text, style) = if let Some(note) = app.notifications.last() {
        let color = match note.level {
            crate::notifications::NotificationLevel::Info => app.theme.info,
            crate::notifications::NotificationLevel::Warning => app.theme.warning,
            crate::notifications::NotificationLevel::Error => app.theme.error,
            crate::notifications::NotificationLevel::Success => app.theme.success,
        };
        (
            format!("{} {}: {}", note.timestamp(), note.level.label(), note.message),
            Style::default().fg(color),
        )
    } else {
        (help.to_string(), Style::default().fg(app.theme.text_dim))
    };

    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(help))
        .style(style);
    f.render_widget(footer, area);
}

/// A rectangle `percent_x` wide and `height` rows tall, centered in `area`.
fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x) / 100) as u16;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}
