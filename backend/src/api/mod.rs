//! API handlers called from the frontend's server functions.

pub mod data_sources;
pub mod latest_search;
pub mod search_execution;
