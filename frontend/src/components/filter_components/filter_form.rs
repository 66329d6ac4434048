use std::rc::Rc;

use common::{
    form_schema::{FormConfig, SearchDomain},
    search_payload::summarize,
    search_state_controller::{SearchServices, SearchStateController, SubmitOutcome},
    section_expansion::SectionExpansion,
};
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::md_action_icons::MdSearch;
use dioxus_free_icons::icons::md_content_icons::MdClear;
use dioxus_free_icons::icons::md_navigation_icons::{MdUnfoldLess, MdUnfoldMore};

use crate::api::collaborators::{RouterNavigator, ServerSearchPersistence};
use crate::components::filter_components::FilterFormContext;
use crate::components::filter_components::filter_section::FilterSection;
use crate::data_definitions::filter_session::FilterSession;

/// The whole filter form for one domain. Mount it with a `key` per domain so
/// a domain switch builds a fresh controller.
#[component]
pub fn FilterForm(domain: SearchDomain) -> Element {
    let session = use_context::<FilterSession>();
    let nav = navigator();
    let revision = use_signal(|| 0_u64);
    let expansion = use_signal(|| SectionExpansion::for_form(FormConfig::for_domain(domain)));

    let (context, subscription) = use_hook(move || {
        session.enter_domain(domain);
        let services = SearchServices::new(Rc::new(ServerSearchPersistence), Rc::new(RouterNavigator(nav)));
        let controller = Rc::new(SearchStateController::new(domain, session.store(domain), services));
        // a domain switch may clear this store while the form is being torn down
        let subscription = controller.store().subscribe(move |_| {
            let mut revision = revision;
            if let Ok(mut count) = revision.try_write() {
                *count += 1;
            }
        });
        (FilterFormContext { controller, cache: session.cache.clone(), revision, expansion }, subscription)
    });
    use_context_provider(|| context.clone());

    // the store belongs to the session and outlives this form
    let store = context.controller.store().clone();
    use_drop(move || store.unsubscribe(subscription));

    let controller = context.controller.clone();
    use_effect(move || {
        let controller = controller.clone();
        spawn(async move {
            let outcome = controller.hydrate_on_mount().await;
            dioxus::logger::tracing::info!("Hydration of {} form: {:?}", controller.domain(), outcome);
        });
    });

    let form = context.controller.form();
    rsx! {
        div {
            id: "x-filter-form",
            style: "
                display:flex;
                flex-direction: column;
                gap: 12px;
                width: 100%;
                max-width: 1100px;
            ",
            FilterToolbar {}
            FilterSummaryLine {}
            for section in form.sections.iter() {
                FilterSection { key: "{section.id}", section_id: section.id.clone() }
            }
        }
    }
}

#[component]
fn FilterToolbar() -> Element {
    let ctx = use_context::<FilterFormContext>();
    let mut expansion = ctx.expansion;
    let mut errors = use_signal(Vec::<String>::new);
    let mut submitting = use_signal(|| false);
    let all_expanded = expansion.read().is_expanded();

    let submit_controller = ctx.controller.clone();
    let clear_controller = ctx.controller.clone();
    rsx! {
        div {
            style: "
                display:flex;
                flex-direction: row;
                gap: 10px;
                align-items: center;
            ",
            button {
                class: "x-filter-button",
                onclick: move |_| {
                    if all_expanded {
                        expansion.write().collapse_all();
                    } else {
                        expansion.write().expand_all();
                    }
                },
                if all_expanded {
                    Icon { icon: MdUnfoldLess, style: "width: 20px; height: 20px;" }
                    "Collapse All"
                } else {
                    Icon { icon: MdUnfoldMore, style: "width: 20px; height: 20px;" }
                    "Expand All"
                }
            }
            div { style: "flex-grow:1;" }
            button {
                class: "x-filter-button",
                onclick: move |_| {
                    clear_controller.clear();
                    errors.set(Vec::new());
                },
                Icon { icon: MdClear, style: "width: 20px; height: 20px;" }
                "Clear"
            }
            button {
                class: "x-filter-button x-filter-button-primary",
                disabled: submitting(),
                onclick: move |_| {
                    let controller = submit_controller.clone();
                    submitting.set(true);
                    spawn(async move {
                        match controller.submit().await {
                            SubmitOutcome::Submitted(_) => errors.set(Vec::new()),
                            SubmitOutcome::Rejected(report) => {
                                dioxus::logger::tracing::warn!("Search rejected: {:?}", report.errors);
                                errors.set(report.errors);
                            }
                        }
                        submitting.set(false);
                    });
                },
                Icon { icon: MdSearch, style: "width: 20px; height: 20px;" }
                if submitting() { "Searching..." } else { "Search" }
            }
        }
        if !errors.read().is_empty() {
            ul {
                class: "x-filter-errors",
                for error in errors.read().iter() {
                    li { key: "{error}", "{error}" }
                }
            }
        }
    }
}

/// One-line description of the current filters.
#[component]
fn FilterSummaryLine() -> Element {
    let ctx = use_context::<FilterFormContext>();
    let _revision = ctx.revision.read();
    let summary = summarize(&ctx.controller.payload(), ctx.controller.form());
    let restored = ctx.controller.is_recent_search();
    rsx! {
        div {
            class: "x-filter-summary",
            "{summary}"
            if restored {
                span { class: "x-filter-restored", " (restored from your latest search)" }
            }
        }
    }
}
