//! Server-side implementations of the filter form's remote collaborators.

pub mod api;
pub(crate) mod db_utils;
