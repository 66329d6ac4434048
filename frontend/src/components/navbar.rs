//! Side navigation bar and the page layout around it.

use common::form_schema::SearchDomain;
use dioxus::prelude::*;
use dioxus_free_icons::icons::md_action_icons::{MdAssignment, MdHome, MdTrendingUp};
use dioxus_free_icons::{Icon, IconShape};

use crate::components::error_boundary::GlobalErrorBoundary;
use crate::data_definitions::filter_session::FilterSession;
use crate::routes::Route;

/// Shared navbar component. Also owns the filter session, so filters survive
/// moving between pages.
#[component]
pub fn Navbar() -> Element {
    use_context_provider(FilterSession::default);
    rsx! {

        div {
            id:"x-nav-container",

            style:"
                display:flex;
                flex-direction: row;
                width: 100%;
                height: 100%;
            ",


            div {
                id:"x-nav-sidebar",
                style:"
                    display:flex;
                    flex-direction: column;
                    gap: 24px;
                    width: 70px;
                    height: 100%;
                    background-color: #1C212D;
                    border: 1px solid #000000;
                    padding: 16px;
                    align-items: center;
                    box-sizing: border-box;
                ",

                IconLink { to: Route::HomePage { }, icon: MdHome, label: "Home" }
                IconLink { to: Route::FilterSearchPage { domain: SearchDomain::Opportunity }, icon: MdTrendingUp, label: SearchDomain::Opportunity.display_name() }
                IconLink { to: Route::FilterSearchPage { domain: SearchDomain::Proposal }, icon: MdAssignment, label: SearchDomain::Proposal.display_name() }
            },

            div {
                id:"x-page-container",
                style: "flex-grow:1; min-width: 100px;",
                GlobalErrorBoundary {
                    boundary_name: "Navbar".to_string(),
                    Outlet::<Route> {}
                }
            }
        }

    }
}

#[component]
fn IconLink<T: IconShape + Clone + PartialEq + 'static> (to: Route, icon: T, label: String) -> Element {
    rsx! {
        Link {
            to: to,
            span {
                title: "{label}",
                style: "color:white;",
                Icon { icon: icon, style: "width: 26px; height: 26px;" }
            }
        }
    }
}
