//! Filter criteria applied to the master list.
//!
//! Every criterion is optional; an empty or unset criterion matches all
//! records. A record passes when it satisfies every active criterion.

use crate::character::{Character, STATUS_ALIVE, STATUS_DECEASED};
use serde::{Deserialize, Serialize};

/// House selector value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum HouseFilter {
    #[default]
    Any,
    /// Case-insensitive substring of the record's house.
    Named(String),
    /// Records without a house.
    NoHouse,
    /// Records whose house is explicitly unknown.
    Unknown,
}

impl HouseFilter {
    pub fn matches(&self, house: &str) -> bool {
        match self {
            HouseFilter::Any => true,
            HouseFilter::Named(name) => {
                let needle = name.trim().to_lowercase();
                needle.is_empty() || house.to_lowercase().contains(&needle)
            }
            HouseFilter::NoHouse => house.trim().is_empty(),
            HouseFilter::Unknown => {
                let lower = house.to_lowercase();
                lower.contains("unknown") || lower.contains("desconocido")
            }
        }
    }

    pub fn label(&self) -> &str {
        match self {
            HouseFilter::Any => "Any",
            HouseFilter::Named(name) => name,
            HouseFilter::NoHouse => "No house",
            HouseFilter::Unknown => "Unknown",
        }
    }
}

/// Life status selector value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    Any,
    Alive,
    Deceased,
}

impl StatusFilter {
    pub fn matches(&self, status: &str) -> bool {
        match self {
            StatusFilter::Any => true,
            StatusFilter::Alive => status.eq_ignore_ascii_case(STATUS_ALIVE),
            StatusFilter::Deceased => status.eq_ignore_ascii_case(STATUS_DECEASED),
        }
    }

    pub fn next(&self) -> Self {
        match self {
            StatusFilter::Any => StatusFilter::Alive,
            StatusFilter::Alive => StatusFilter::Deceased,
            StatusFilter::Deceased => StatusFilter::Any,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            StatusFilter::Any => StatusFilter::Deceased,
            StatusFilter::Alive => StatusFilter::Any,
            StatusFilter::Deceased => StatusFilter::Alive,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::Any => "Any",
            StatusFilter::Alive => "Alive",
            StatusFilter::Deceased => "Deceased",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Free text matched against the name.
    pub text: String,
    pub house: HouseFilter,
    pub status: StatusFilter,
    pub patronus: String,
    pub favorites_only: bool,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
            && self.house == HouseFilter::Any
            && self.status == StatusFilter::Any
            && self.patronus.trim().is_empty()
            && !self.favorites_only
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn matches(&self, character: &Character) -> bool {
        contains_ci(&character.name, &self.text)
            && self.house.matches(&character.house)
            && self.status.matches(&character.status)
            && contains_ci(&character.patronus, &self.patronus)
            && (!self.favorites_only || character.favorite)
    }
}

/// Case-insensitive, trimmed substring match. An empty needle matches.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    needle.is_empty() || haystack.to_lowercase().contains(&needle)
}
