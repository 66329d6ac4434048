use common::form_schema::SearchDomain;
use dioxus::prelude::*;

use crate::components::filter_components::filter_form::FilterForm;
use crate::routes::Route;

/// Filter page for one search domain, with tabs to switch domain.
#[component]
pub fn FilterSearchPage(domain: SearchDomain) -> Element {
    rsx! {
        Title { "Search - {domain.display_name()}" }
        div {
            id: "x-filter-page",
            style: "
                display:flex;
                flex-direction: column;
                gap: 20px;
                width: 100%;
                height: 100%;
                padding: 28px 36px;
                box-sizing: border-box;
                overflow: auto;
            ",
            div {
                style: "display:flex; flex-direction: row; gap: 8px;",
                for tab in SearchDomain::ALL {
                    Link {
                        key: "{tab}",
                        class: tab_class(tab, domain),
                        to: Route::FilterSearchPage { domain: tab },
                        "{tab.display_name()}"
                    }
                }
            }
            FilterForm { key: "{domain}", domain }
        }
    }
}

fn tab_class(tab: SearchDomain, current: SearchDomain) -> String {
    if tab == current { "x-domain-tab x-domain-tab-active".to_string() } else { "x-domain-tab".to_string() }
}
