//! In-memory catalog: master list, filtered view, and pagination.
//!
//! The filtered view holds indices into the master list so that it is
//! always an order-preserving subsequence of it.

use crate::character::Character;
use crate::filter::FilterCriteria;
use crate::houses::{house_options, HouseOptions};
use serde::{Deserialize, Serialize};

/// Number of records per page.
pub const PAGE_SIZE: usize = 20;

/// What happens to the current page when the filtered view is recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageMode {
    /// Back to the first page.
    #[default]
    Reset,
    /// Keep the current page, clamped to the new page count.
    Preserve,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    master: Vec<Character>,
    criteria: FilterCriteria,
    filtered: Vec<usize>,
    current_page: usize,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Character>) -> Self {
        let mut catalog = Self::new();
        catalog.replace_all(records, PageMode::Reset);
        catalog
    }

    pub fn master(&self) -> &[Character] {
        &self.master
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Mutable access to the criteria. Call [`Catalog::apply_filters`]
    /// afterwards; the filtered view is not recomputed here.
    pub fn criteria_mut(&mut self) -> &mut FilterCriteria {
        &mut self.criteria
    }

    /// Replace the criteria and recompute the filtered view.
    pub fn set_criteria(&mut self, criteria: FilterCriteria, mode: PageMode) {
        self.criteria = criteria;
        self.apply_filters(mode);
    }

    /// Replace the master list wholesale, then reapply the filters.
    pub fn replace_all(&mut self, records: Vec<Character>, mode: PageMode) {
        self.master = records;
        self.apply_filters(mode);
    }

    /// Recompute the filtered view from the master list.
    pub fn apply_filters(&mut self, mode: PageMode) {
        self.filtered = self
            .master
            .iter()
            .enumerate()
            .filter(|(_, character)| self.criteria.matches(character))
            .map(|(index, _)| index)
            .collect();

        match mode {
            PageMode::Reset => self.current_page = 0,
            PageMode::Preserve => self.current_page = self.clamp_page(self.current_page),
        }
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn filtered(&self) -> impl Iterator<Item = &Character> + '_ {
        self.filtered.iter().map(move |&index| &self.master[index])
    }

    /// Number of pages; never zero so that an empty result shows "1 of 1".
    pub fn page_count(&self) -> usize {
        self.filtered.len().div_ceil(PAGE_SIZE).max(1)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Move to page `page`, clamped to the valid range. Returns the page
    /// actually selected.
    pub fn goto_page(&mut self, page: usize) -> usize {
        self.current_page = self.clamp_page(page);
        self.current_page
    }

    pub fn next_page(&mut self) -> usize {
        self.goto_page(self.current_page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> usize {
        self.goto_page(self.current_page.saturating_sub(1))
    }

    pub fn has_previous(&self) -> bool {
        !self.filtered.is_empty() && self.current_page > 0
    }

    pub fn has_next(&self) -> bool {
        !self.filtered.is_empty() && self.current_page + 1 < self.page_count()
    }

    /// Bounds of the visible slice within the filtered view.
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        let start = (self.current_page * PAGE_SIZE).min(self.filtered.len());
        let end = (start + PAGE_SIZE).min(self.filtered.len());
        start..end
    }

    /// Records on the current page.
    pub fn visible(&self) -> Vec<&Character> {
        self.filtered[self.visible_range()]
            .iter()
            .map(|&index| &self.master[index])
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Character> {
        self.master.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Character> {
        self.master.iter_mut().find(|c| c.id == id)
    }

    /// Insert or replace a record by id, keeping its position if it exists.
    pub fn upsert(&mut self, character: Character) {
        if let Some(existing) = self.master.iter_mut().find(|c| c.id == character.id) {
            *existing = character;
        } else {
            self.master.push(character);
        }
        self.apply_filters(PageMode::Preserve);
    }

    pub fn remove(&mut self, id: &str) -> Option<Character> {
        let position = self.master.iter().position(|c| c.id == id)?;
        let removed = self.master.remove(position);
        self.apply_filters(PageMode::Preserve);
        Some(removed)
    }

    /// Update the favorite flag of one record. Returns false when the id
    /// is not in the master list.
    pub fn set_favorite(&mut self, id: &str, favorite: bool) -> bool {
        match self.get_mut(id) {
            Some(character) => {
                character.favorite = favorite;
                self.apply_filters(PageMode::Preserve);
                true
            }
            None => false,
        }
    }

    pub fn house_options(&self) -> HouseOptions {
        house_options(&self.master)
    }

    fn clamp_page(&self, page: usize) -> usize {
        page.min(self.page_count() - 1)
    }
}
