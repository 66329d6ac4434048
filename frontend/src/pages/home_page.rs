use common::form_schema::SearchDomain;
use dioxus::prelude::*;
use dioxus_free_icons::icons::md_action_icons::MdSearch;
use dioxus_free_icons::Icon;

use crate::routes::Route;

/// Home page
#[component]
pub fn HomePage() -> Element {
    rsx! {
        Title { "Search - Home" }
        div {
            id: "x-home-container",
            style: "
                display:flex;
                flex-direction: column;
                gap: 20px;
                width: 100%;
                height: 100%;
                padding: 36px 40px;
                background: #F5F6F8;
                box-sizing: border-box;
                overflow: auto;
            ",
            div {
                style: "
                    color: #0F172A;
                    font-size: 46px;
                    font-weight: 500;
                    letter-spacing: -0.02em;
                ",
                "Advanced Search"
            }

            // Cards Row
            div {
                style: "
                    display:flex;
                    flex-direction: row;
                    gap: 20px;
                    flex-wrap: wrap;
                    align-items: stretch;
                ",
                DomainCard {
                    domain: SearchDomain::Opportunity,
                    description: "Filter the pipeline by owner, account, stage, amount and close date.",
                    background: "linear-gradient(135deg, #2D208A 0%, #5B3DF5 100%)",
                }
                DomainCard {
                    domain: SearchDomain::Proposal,
                    description: "Find proposals by client, preparer, status and submission quarter.",
                    background: "linear-gradient(135deg, #0B7A2B 0%, #23A340 60%, #178E35 100%)",
                }
            }
        }
    }
}

#[component]
fn DomainCard(domain: SearchDomain, description: String, background: String) -> Element {
    rsx! {
        Link {
            to: Route::FilterSearchPage { domain },
            style: "
                display:flex;
                flex-direction: column;
                gap: 14px;
                width: 420px;
                min-height: 200px;
                border-radius: 22px;
                padding: 22px;
                background: {background};
                color: white;
                text-decoration: none;
                box-shadow: 0 8px 24px rgba(0,0,0,0.12);
            ",
            div {
                style: "display:flex; align-items:center; gap: 10px; font-size: 30px; font-weight: 500;",
                Icon { icon: MdSearch, style: "width: 28px; height: 28px;" }
                "{domain.display_name()}"
            }
            div {
                style: "font-size: 20px; line-height: 1.5; color: rgba(255,255,255,0.92);",
                "{description}"
            }
        }
    }
}
