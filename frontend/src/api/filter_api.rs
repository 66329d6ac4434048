//! Client API calls for the filter form endpoints.

use common::{
    contracts::{RecentSearch, SearchResults},
    form_schema::{DataSourceOption, SearchDomain},
    search_payload::SearchPayload,
};
use dioxus::prelude::*;

#[server]
pub async fn list_data_source_options(source_name: String) -> Result<Vec<DataSourceOption>, ServerFnError> {
    let x = backend::api::data_sources::list_data_source_options(source_name).await;
    x.map_err(|e| ServerFnError::ServerError { message: e.to_string(), code: 500, details: None })
}

#[server]
pub async fn search_data_source_options(source_name: String, query: String) -> Result<Vec<DataSourceOption>, ServerFnError> {
    let x = backend::api::data_sources::search_data_source_options(source_name, query).await;
    x.map_err(|e| ServerFnError::ServerError { message: e.to_string(), code: 500, details: None })
}

#[server]
pub async fn save_latest_search(payload: SearchPayload) -> Result<(), ServerFnError> {
    let x = backend::api::latest_search::save_latest_search(payload).await;
    x.map_err(|e| ServerFnError::ServerError { message: e.to_string(), code: 500, details: None })
}

#[server]
pub async fn load_latest_search(domain: SearchDomain) -> Result<RecentSearch, ServerFnError> {
    let x = backend::api::latest_search::load_latest_search(domain).await;
    x.map_err(|e| ServerFnError::ServerError { message: e.to_string(), code: 500, details: None })
}

#[server]
pub async fn execute_search(payload: SearchPayload) -> Result<SearchResults, ServerFnError> {
    let x = backend::api::search_execution::execute_search(payload).await;
    x.map_err(|e| ServerFnError::ServerError { message: e.to_string(), code: 500, details: None })
}
