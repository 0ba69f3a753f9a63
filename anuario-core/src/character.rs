//! Character record and its mapping from backend JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status label for a character whose `died` field is filled in.
pub const STATUS_DECEASED: &str = "Fallecido";

/// Status label for every other character.
pub const STATUS_ALIVE: &str = "Vivo";

/// Separator used when flattening list-typed fields.
pub const LIST_SEPARATOR: &str = ", ";

/// One character as received from the backend.
///
/// All fields are plain strings because the backend makes no guarantees
/// about presence; a missing value is an empty string. List-typed fields
/// (`alias`, `titles`, `wand`, ...) are stored comma-joined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub house: String,
    /// Derived from `died`, see [`status_for_died`].
    pub status: String,
    pub patronus: String,
    pub image: String,
    pub favorite: bool,

    pub born: String,
    pub died: String,
    pub gender: String,
    pub species: String,
    pub blood_status: String,
    pub role: String,
    pub wiki: String,
    pub animagus: String,
    pub boggart: String,
    pub nationality: String,

    pub alias: String,
    pub titles: String,
    pub wand: String,
    pub romances: String,
    pub family: String,
    pub jobs: String,

    pub eye_color: String,
    pub hair_color: String,
    pub skin_color: String,
    pub height: String,
    pub weight: String,
}

impl Character {
    /// Map one JSON element of the collection response.
    ///
    /// Returns `None` when the element is not an object. Any other shape
    /// problem degrades to empty fields.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let died = string_or_empty(obj, "died");

        Some(Self {
            id: string_or_empty(obj, "id"),
            name: string_or_empty(obj, "name"),
            house: string_or_empty(obj, "house"),
            status: status_for_died(&died).to_string(),
            patronus: string_or_empty(obj, "patronus"),
            image: string_or_empty(obj, "image"),
            favorite: obj
                .get("is_favorite")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            born: string_or_empty(obj, "born"),
            died,
            gender: string_or_empty(obj, "gender"),
            species: string_or_empty(obj, "species"),
            blood_status: string_or_empty(obj, "blood_status"),
            role: string_or_empty(obj, "role"),
            wiki: string_or_empty(obj, "wiki"),
            animagus: string_or_empty(obj, "animagus"),
            boggart: string_or_empty(obj, "boggart"),
            nationality: string_or_empty(obj, "nationality"),
            alias: list_as_string(obj, "alias_names"),
            titles: list_as_string(obj, "titles"),
            wand: list_as_string(obj, "wand"),
            romances: list_as_string(obj, "romances"),
            family: list_as_string(obj, "family_member"),
            jobs: list_as_string(obj, "jobs"),
            eye_color: string_or_empty(obj, "eye_color"),
            hair_color: string_or_empty(obj, "hair_color"),
            skin_color: string_or_empty(obj, "skin_color"),
            height: string_or_empty(obj, "height"),
            weight: string_or_empty(obj, "weight"),
        })
    }

    /// Map a whole collection response, skipping non-object elements.
    ///
    /// The second value is the number of skipped elements.
    pub fn from_json_array(values: &[Value]) -> (Vec<Self>, usize) {
        let mut skipped = 0;
        let characters = values
            .iter()
            .filter_map(|value| {
                let mapped = Self::from_json(value);
                if mapped.is_none() {
                    skipped += 1;
                }
                mapped
            })
            .collect();
        (characters, skipped)
    }

    pub fn is_deceased(&self) -> bool {
        self.status.eq_ignore_ascii_case(STATUS_DECEASED)
    }

    /// Recompute `status` after `died` was edited.
    pub fn refresh_status(&mut self) {
        self.status = status_for_died(&self.died).to_string();
    }
}

/// Status label for a `died` value.
pub fn status_for_died(died: &str) -> &'static str {
    if died.is_empty() {
        STATUS_ALIVE
    } else {
        STATUS_DECEASED
    }
}

fn string_or_empty(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key).map(primitive_to_string).unwrap_or_default()
}

fn list_as_string(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(primitive_to_string)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
        Some(value) => primitive_to_string(value),
        None => String::new(),
    }
}

fn primitive_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let character = Character::from_json(&json!({ "name": "Luna Lovegood" })).unwrap();
        assert_eq!(character.name, "Luna Lovegood");
        assert_eq!(character.house, "");
        assert_eq!(character.patronus, "");
        assert!(!character.favorite);
    }

    #[test]
    fn test_died_present_maps_to_deceased() {
        let character = Character::from_json(&json!({
            "name": "Sirius Black",
            "died": "18 June, 1996"
        }))
        .unwrap();
        assert_eq!(character.status, STATUS_DECEASED);
        assert!(character.is_deceased());
    }

    #[test]
    fn test_died_empty_or_null_maps_to_alive() {
        let empty = Character::from_json(&json!({ "died": "" })).unwrap();
        let null = Character::from_json(&json!({ "died": null })).unwrap();
        assert_eq!(empty.status, STATUS_ALIVE);
        assert_eq!(null.status, STATUS_ALIVE);
    }

    #[test]
    fn test_numeric_id_is_stringified() {
        let character = Character::from_json(&json!({ "id": 42 })).unwrap();
        assert_eq!(character.id, "42");
    }

    #[test]
    fn test_list_fields_are_comma_joined() {
        let character = Character::from_json(&json!({
            "alias_names": ["Padfoot", "Snuffles"],
            "wand": "11\", oak",
            "jobs": null
        }))
        .unwrap();
        assert_eq!(character.alias, "Padfoot, Snuffles");
        assert_eq!(character.wand, "11\", oak");
        assert_eq!(character.jobs, "");
    }

    #[test]
    fn test_family_member_maps_to_family() {
        let character = Character::from_json(&json!({
            "family_member": ["James Potter", "Lily Potter"]
        }))
        .unwrap();
        assert_eq!(character.family, "James Potter, Lily Potter");
    }

    #[test]
    fn test_favorite_non_bool_defaults_false() {
        let character = Character::from_json(&json!({ "is_favorite": "yes" })).unwrap();
        assert!(!character.favorite);
        let character = Character::from_json(&json!({ "is_favorite": true })).unwrap();
        assert!(character.favorite);
    }

    #[test]
    fn test_non_object_elements_are_skipped() {
        let values = vec![json!({ "name": "A" }), json!(3), json!({ "name": "B" })];
        let (characters, skipped) = Character::from_json_array(&values);
        assert_eq!(skipped, 1);
        assert_eq!(characters.len(), 2);
        assert_eq!(characters[1].name, "B");
    }

    #[test]
    fn test_refresh_status_follows_died() {
        let mut character = Character::default();
        character.died = "1981".to_string();
        character.refresh_status();
        assert_eq!(character.status, STATUS_DECEASED);
        character.died.clear();
        character.refresh_status();
        assert_eq!(character.status, STATUS_ALIVE);
    }
}
