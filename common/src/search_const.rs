//! Wire-format and layout constants shared by the frontend and backend.
//!
//! The prefixes and the terminator are a fixed contract with the search backend.

pub const IDENTIFIER_PREFIX: &str = "IE=";
pub const STARTS_WITH_PREFIX: &str = "SW=";
pub const IS_EMPTY_PREFIX: &str = "IN=";
pub const IS_NOT_EMPTY_PREFIX: &str = "INN=";
pub const FRAGMENT_TERMINATOR: char = '~';

/// Separator for the few fields that bypass the token grammar.
pub const PLAIN_LIST_SEPARATOR: &str = ",";

/// Selecting any of these clears the whole field.
pub const ALL_SENTINELS: &[&str] = &["All", "ALL", "All Reps", "ALL_REPS"];

pub const IS_EMPTY_LABEL: &str = "Is Empty";
pub const IS_NOT_EMPTY_LABEL: &str = "Is Not Empty";

/// Width budget of one form row, in column-span units.
pub const ROW_SPAN_CAPACITY: u16 = 12;

pub const QUICK_SEARCH_DEBOUNCE_MS: u64 = 300;
pub const QUICK_SEARCH_MIN_CHARS: usize = 3;

pub const DEFAULT_PAGE_TYPE: &str = "advancedSearch";
