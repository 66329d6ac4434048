//! Common library exports shared between frontend and backend.

extern crate serde;

pub mod search_const;
pub mod filter_codec;
pub mod form_schema;
pub mod row_layout;
pub mod section_expansion;
pub mod search_state;
pub mod search_payload;
pub mod contracts;
pub mod data_source_cache;
pub mod debounce;
pub mod search_state_controller;
