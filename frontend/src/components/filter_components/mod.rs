//! The filter form and its parts.

use std::rc::Rc;

use common::{
    data_source_cache::DataSourceCache, section_expansion::SectionExpansion,
    search_state_controller::SearchStateController,
};
use dioxus::prelude::*;

pub mod filter_form;
pub mod filter_section;
pub mod filter_field;
pub mod quick_search_box;

/// Shared by every part of one mounted filter form.
#[derive(Clone)]
pub struct FilterFormContext {
    pub controller: Rc<SearchStateController>,
    pub cache: DataSourceCache,
    /// Bumped whenever the store changes; read it to re-render on edits.
    pub revision: Signal<u64>,
    pub expansion: Signal<SectionExpansion>,
}
