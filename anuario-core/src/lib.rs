//! Anuario Core - catalog data types
//!
//! The character record, its JSON mapping, and the filter/pagination
//! engine over the in-memory master list. No I/O happens here.

pub mod catalog;
pub mod character;
pub mod error;
pub mod filter;
pub mod houses;
pub mod payload;

pub use catalog::{Catalog, PageMode, PAGE_SIZE};
pub use character::{status_for_died, Character, STATUS_ALIVE, STATUS_DECEASED};
pub use error::ValidationError;
pub use filter::{FilterCriteria, HouseFilter, StatusFilter};
pub use houses::{house_options, HouseOptions};
pub use payload::{split_list, CharacterPayload, PLACEHOLDER_IMAGE};
