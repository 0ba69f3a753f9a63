//! House selector options derived from the master list.

use crate::character::Character;
use crate::filter::HouseFilter;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static HOUSE_SEPARATORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+or\s+|\s+y\s+|/|,|\s*&\s*").expect("house separator pattern is valid")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HouseOptions {
    /// Distinct house names, sorted.
    pub named: Vec<String>,
    /// At least one record says its house is unknown.
    pub has_unknown: bool,
    /// At least one record has no house.
    pub has_none: bool,
}

impl HouseOptions {
    /// Selector entries in display order: `Any`, named houses, then the
    /// unknown and no-house entries when present.
    pub fn filters(&self) -> Vec<HouseFilter> {
        let mut filters = Vec::with_capacity(self.named.len() + 3);
        filters.push(HouseFilter::Any);
        filters.extend(self.named.iter().cloned().map(HouseFilter::Named));
        if self.has_unknown {
            filters.push(HouseFilter::Unknown);
        }
        if self.has_none {
            filters.push(HouseFilter::NoHouse);
        }
        filters
    }

    /// Whether `filter` is still selectable after a refresh.
    pub fn contains(&self, filter: &HouseFilter) -> bool {
        match filter {
            HouseFilter::Any => true,
            HouseFilter::Named(name) => self.named.iter().any(|n| n == name),
            HouseFilter::Unknown => self.has_unknown,
            HouseFilter::NoHouse => self.has_none,
        }
    }
}

pub fn house_options(records: &[Character]) -> HouseOptions {
    let mut named = BTreeSet::new();
    let mut has_unknown = false;
    let mut has_none = false;

    for record in records {
        let raw = record.house.trim();
        if raw.is_empty() {
            has_none = true;
            continue;
        }

        for part in HOUSE_SEPARATORS.split(raw) {
            let clean = strip_annotation(part.trim());
            if clean.is_empty() {
                continue;
            }
            let lower = clean.to_lowercase();
            if lower == "unknown" || lower == "desconocido" {
                has_unknown = true;
            } else {
                named.insert(clean.to_string());
            }
        }
    }

    HouseOptions {
        named: named.into_iter().collect(),
        has_unknown,
        has_none,
    }
}

/// Truncate at the first `(` or `[`.
fn strip_annotation(part: &str) -> &str {
    match part.find(['(', '[']) {
        Some(pos) => part[..pos].trim(),
        None => part,
    }
}
