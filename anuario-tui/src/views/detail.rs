//! Full record view.

use crate::state::App;
use crate::theme::house_color;
use crate::widgets::DetailPanel;
use anuario_core::Character;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(character) = app.detail_character() else {
        let empty = Paragraph::new("No character selected. Pick one in the catalog.")
            .style(Style::default().fg(app.theme.text_dim))
            .block(Block::default().title("Detail").borders(Borders::ALL));
        f.render_widget(empty, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let favorite = if character.favorite { " ★" } else { "" };
    let heading = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                character.name.clone(),
                Style::default()
                    .fg(app.theme.primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(favorite, Style::default().fg(app.theme.warning)),
        ]),
        Line::from(Span::styled(
            character.house.clone(),
            Style::default().fg(house_color(&character.house, &app.theme)),
        )),
    ])
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(heading, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let style = Style::default().fg(app.theme.secondary);
    DetailPanel::new("Profile", profile_fields(character), style).render(f, columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(4)])
        .split(columns[1]);
    DetailPanel::new("Life", life_fields(character), style).render(f, right[0]);

    let links = Paragraph::new(vec![
        Line::from(format!("Image: {}", character.image)),
        Line::from(format!("Wiki: {}", character.wiki)),
    ])
    .wrap(Wrap { trim: true })
    .style(Style::default().fg(app.theme.text_dim))
    .block(Block::default().title("Links").borders(Borders::ALL));
    f.render_widget(links, right[1]);
}

fn profile_fields(c: &Character) -> Vec<(&'static str, String)> {
    vec![
        ("Status", c.status.clone()),
        ("Born", c.born.clone()),
        ("Died", c.died.clone()),
        ("Gender", c.gender.clone()),
        ("Species", c.species.clone()),
        ("Blood status", c.blood_status.clone()),
        ("Nationality", c.nationality.clone()),
        ("Eye color", c.eye_color.clone()),
        ("Hair color", c.hair_color.clone()),
        ("Skin color", c.skin_color.clone()),
        ("Height", c.height.clone()),
        ("Weight", c.weight.clone()),
    ]
}

fn life_fields(c: &Character) -> Vec<(&'static str, String)> {
    vec![
        ("Role", c.role.clone()),
        ("Patronus", c.patronus.clone()),
        ("Boggart", c.boggart.clone()),
        ("Animagus", c.animagus.clone()),
        ("Wand", c.wand.clone()),
        ("Aliases", c.alias.clone()),
        ("Titles", c.titles.clone()),
        ("Jobs", c.jobs.clone()),
        ("Family", c.family.clone()),
        ("Romances", c.romances.clone()),
    ]
}
