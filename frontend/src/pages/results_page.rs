use common::contracts::{ResultsHandoff, SearchExecutor};
use dioxus::prelude::*;

use crate::api::collaborators::ServerSearchExecutor;
use crate::components::error_boundary::ComponentErrorDisplay;
use crate::components::suspend_boundary::SuspendWrapper;
use crate::data_definitions::url_param::UrlParam;
use crate::routes::Route;

/// Results of a submitted search. The handoff is part of the route.
#[component]
pub fn ResultsPage(handoff: UrlParam<ResultsHandoff>) -> Element {
    let handoff = handoff.into_inner();
    let domain = handoff.payload.domain;
    rsx! {
        Title { "Search - Results" }
        div {
            id: "x-results-page",
            style: "
                display:flex;
                flex-direction: column;
                gap: 16px;
                width: 100%;
                height: 100%;
                padding: 28px 36px;
                box-sizing: border-box;
                overflow: auto;
            ",
            div {
                style: "display:flex; flex-direction: row; align-items: center; gap: 16px;",
                h2 { "{domain.display_name()}" }
                // back to a form that kept its state
                Link { class: "x-filter-button", to: Route::FilterSearchPage { domain }, "Modify search" }
            }
            div { class: "x-filter-summary", "{handoff.summary}" }
            SuspendWrapper {
                ResultRows { handoff: handoff.clone() }
            }
        }
    }
}

#[component]
fn ResultRows(handoff: ReadSignal<ResultsHandoff>) -> Element {
    let results = use_resource(move || {
        let payload = handoff.read().payload.clone();
        async move {
            let executor = ServerSearchExecutor;
            executor.execute(&payload).await.map_err(|e| e.to_string())
        }
    }).suspend()?.cloned();
    let results = match results {
        Err(e) => return rsx! { ComponentErrorDisplay { error_txt: e } },
        Ok(r) => r,
    };
    rsx! {
        div { style: "font-size: 18px; font-weight: 500;", "{results.total} results" }
        ul {
            class: "x-result-rows",
            for (index, row) in results.rows.iter().enumerate() {
                li {
                    key: "{index}",
                    pre { {serde_json::to_string_pretty(row).unwrap_or_default()} }
                }
            }
        }
    }
}
