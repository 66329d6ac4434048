//! Browser-side implementations of the filter core's collaborator traits.

use std::time::Duration;

use common::{
    contracts::{OptionLoader, RecentSearch, ResultsHandoff, ResultsNavigator, SearchExecutor, SearchPersistence, SearchResults},
    debounce::{CancelToken, Scheduler},
    form_schema::{DataSourceOption, SearchDomain},
    search_payload::SearchPayload,
};
use dioxus::prelude::*;
use dioxus::router::Navigator;
use futures_util::future::LocalBoxFuture;
use gloo_timers::callback::Timeout;

use crate::api::filter_api::{execute_search, list_data_source_options, load_latest_search, save_latest_search};
use crate::routes::Route;

fn server_error(e: ServerFnError) -> anyhow::Error {
    anyhow::anyhow!("{e}")
}

/// Loads option lists through the server functions.
pub struct ServerOptionLoader;

impl OptionLoader for ServerOptionLoader {
    fn fetch<'a>(&'a self, source_name: &'a str) -> LocalBoxFuture<'a, anyhow::Result<Vec<DataSourceOption>>> {
        Box::pin(async move { list_data_source_options(source_name.to_string()).await.map_err(server_error) })
    }
}

pub struct ServerSearchPersistence;

impl SearchPersistence for ServerSearchPersistence {
    fn save<'a>(&'a self, payload: &'a SearchPayload) -> LocalBoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move { save_latest_search(payload.clone()).await.map_err(server_error) })
    }

    fn load_recent(&self, domain: SearchDomain) -> LocalBoxFuture<'_, anyhow::Result<RecentSearch>> {
        Box::pin(async move { load_latest_search(domain).await.map_err(server_error) })
    }
}

pub struct ServerSearchExecutor;

impl SearchExecutor for ServerSearchExecutor {
    fn execute<'a>(&'a self, payload: &'a SearchPayload) -> LocalBoxFuture<'a, anyhow::Result<SearchResults>> {
        Box::pin(async move { execute_search(payload.clone()).await.map_err(server_error) })
    }
}

/// Opens the results page with the handoff encoded in the route.
pub struct RouterNavigator(pub Navigator);

impl ResultsNavigator for RouterNavigator {
    fn navigate(&self, handoff: ResultsHandoff) {
        dioxus::logger::tracing::info!("Opening results: {}", handoff.summary);
        self.0.push(Route::results_page_from_handoff(handoff));
    }
}

/// Browser timers. Dropping the token also clears the timeout.
#[derive(Clone, Copy, Default)]
pub struct GlooScheduler;

impl Scheduler for GlooScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> CancelToken {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        let timeout = Timeout::new(millis, task);
        CancelToken::new(move || {
            timeout.cancel();
        })
    }
}
