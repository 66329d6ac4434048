//! Collaborator interfaces the filter core calls out to.
//!
//! Everything runs on one cooperative event loop, so the futures are local
//! (`!Send`) and implementations are free to hold `Rc` state.

use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

use crate::{
    form_schema::{DataSourceOption, SearchDomain},
    search_payload::SearchPayload,
};

/// Fetches the option list of a named data source. Failures must come back as `Err`.
pub trait OptionLoader {
    fn fetch<'a>(&'a self, source_name: &'a str) -> LocalBoxFuture<'a, anyhow::Result<Vec<DataSourceOption>>>;
}

/// Best-effort storage of the latest search.
pub trait SearchPersistence {
    fn save<'a>(&'a self, payload: &'a SearchPayload) -> LocalBoxFuture<'a, anyhow::Result<()>>;
    fn load_recent(&self, domain: SearchDomain) -> LocalBoxFuture<'_, anyhow::Result<RecentSearch>>;
}

/// Hands a submitted search over to the results view.
pub trait ResultsNavigator {
    fn navigate(&self, handoff: ResultsHandoff);
}

/// Runs a search against the backend engine.
pub trait SearchExecutor {
    fn execute<'a>(&'a self, payload: &'a SearchPayload) -> LocalBoxFuture<'a, anyhow::Result<SearchResults>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub success: bool,
    pub search_params: Option<SearchPayload>,
}

impl RecentSearch {
    /// A successful lookup that found no saved search.
    pub fn nothing_saved() -> Self {
        Self { success: true, search_params: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsHandoff {
    pub payload: SearchPayload,
    pub summary: String,
    /// The form keeps its on-screen state when the results view opens.
    pub preserve_form_state: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchResults {
    pub total: u64,
    pub rows: Vec<serde_json::Value>,
}
