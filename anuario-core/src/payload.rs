//! Request body for creating or updating a character.

use crate::character::Character;
use crate::error::ValidationError;
use serde::Serialize;

/// Image sent when a record has none.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x400?text=No+Image";

/// `died` value sent for a deceased character with no date.
pub const UNKNOWN_DEATH: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterPayload {
    pub name: String,
    pub house: String,
    pub died: String,
    pub species: String,
    pub gender: String,
    pub patronus: String,

    pub eye_color: String,
    pub hair_color: String,
    pub skin_color: String,
    pub height: String,
    pub weight: String,

    pub born: String,
    pub boggart: String,
    pub animagus: String,
    pub nationality: String,

    pub alias_names: Vec<String>,
    pub titles: Vec<String>,
    pub jobs: Vec<String>,
    pub romances: Vec<String>,
    pub family_member: Vec<String>,
    pub wand: Vec<String>,

    pub image: String,
}

impl CharacterPayload {
    /// Build the body for `character`, rejecting records without a name.
    pub fn from_character(character: &Character) -> Result<Self, ValidationError> {
        let name = character.name.trim();
        if name.is_empty() {
            return Err(ValidationError::RequiredFieldMissing { field: "name" });
        }

        let died = if character.is_deceased() || !character.died.trim().is_empty() {
            if character.died.trim().is_empty() {
                UNKNOWN_DEATH.to_string()
            } else {
                character.died.trim().to_string()
            }
        } else {
            String::new()
        };

        let image = if character.image.trim().is_empty() {
            PLACEHOLDER_IMAGE.to_string()
        } else {
            character.image.clone()
        };

        Ok(Self {
            name: name.to_string(),
            house: character.house.clone(),
            died,
            species: character.species.clone(),
            gender: character.gender.clone(),
            patronus: character.patronus.clone(),
            eye_color: character.eye_color.clone(),
            hair_color: character.hair_color.clone(),
            skin_color: character.skin_color.clone(),
            height: character.height.clone(),
            weight: character.weight.clone(),
            born: character.born.clone(),
            boggart: character.boggart.clone(),
            animagus: character.animagus.clone(),
            nationality: character.nationality.clone(),
            alias_names: split_list(&character.alias),
            titles: split_list(&character.titles),
            jobs: split_list(&character.jobs),
            romances: split_list(&character.romances),
            family_member: split_list(&character.family),
            wand: split_list(&character.wand),
            image,
        })
    }
}

/// Split comma-joined text into trimmed, non-empty items.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
