//! Autocomplete field: selected values as chips plus a debounced search box.

use std::rc::Rc;

use common::debounce::QuickSearchTrigger;
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::md_action_icons::MdSearch;
use dioxus_free_icons::icons::md_content_icons::MdClear;

use crate::api::collaborators::GlooScheduler;
use crate::api::filter_api::search_data_source_options;
use crate::components::filter_components::FilterFormContext;

#[component]
pub fn QuickSearchBox(field_name: ReadSignal<String>) -> Element {
    let ctx = use_context::<FilterFormContext>();
    let _revision = ctx.revision.read();
    let name = field_name.read().clone();
    let field = ctx.controller.form().field(&name);
    let source = field.and_then(|f| f.data_source_name.clone()).unwrap_or_default();
    let placeholder = field.and_then(|f| f.placeholder.clone()).unwrap_or("Type to search".to_string());
    let selections = ctx.controller.selections(&name);

    let mut text = use_signal(String::new);
    // set by the debounce timer once typing pauses
    let mut query = use_signal(|| None::<String>);
    let trigger = use_hook(|| Rc::new(QuickSearchTrigger::new(GlooScheduler)));

    // Nothing in the shared search core guards against a stale reply overtaking
    // a newer one. use_resource does it here by dropping the superseded future;
    // other callers of search_data_source_options get no such guarantee.
    let suggestions = use_resource(move || {
        let source = source.clone();
        let q = query.read().clone();
        async move {
            match q {
                Some(q) if !source.is_empty() => search_data_source_options(source, q).await,
                _ => Ok(Vec::new()),
            }
        }
    });

    let searching = trigger.is_pending();
    let remove_controller = ctx.controller.clone();
    let pick_controller = ctx.controller.clone();
    rsx! {
        div {
            class: "x-quick-search",
            div {
                class: "x-filter-chips",
                for value in selections.iter() {
                    span {
                        key: "{value}",
                        class: "x-filter-chip",
                        "{value}"
                        button {
                            onclick: {
                                let controller = remove_controller.clone();
                                let value = value.clone();
                                move |e: MouseEvent| {
                                    e.prevent_default();
                                    controller.select_option(&field_name.read(), &value);
                                }
                            },
                            Icon { icon: MdClear, style: "width: 14px; height: 14px;" }
                        }
                    }
                }
            }
            div {
                class: "x-filter-input",
                style: "display:flex; align-items:center; gap: 6px;",
                Icon { icon: MdSearch, style: "width: 18px; height: 18px; color:#6B7280;" }
                input {
                    r#type: "text",
                    style: "flex:1; border: none; outline: none; background: transparent;",
                    placeholder: "{placeholder}",
                    value: "{text}",
                    oninput: move |e| {
                        text.set(e.value());
                        let scheduled = trigger.on_input(&e.value(), move |q| {
                            let mut query = query;
                            query.set(Some(q));
                        });
                        if !scheduled {
                            query.set(None);
                        }
                    },
                }
            }
            if searching {
                div { class: "x-filter-hint", "Searching..." }
            }
            match &*suggestions.read() {
                Some(Ok(options)) if !options.is_empty() => rsx! {
                    ul {
                        class: "x-filter-option-list",
                        for opt in options.iter() {
                            li {
                                key: "{opt.value}",
                                class: "x-filter-option",
                                onclick: {
                                    let controller = pick_controller.clone();
                                    let value = opt.value.clone();
                                    move |_| {
                                        controller.select_option(&field_name.read(), &value);
                                        text.set(String::new());
                                        query.set(None);
                                    }
                                },
                                "{opt.label}"
                            }
                        }
                    }
                },
                Some(Err(e)) => rsx! {
                    div { class: "x-filter-errors", "Suggestions unavailable: {e}" }
                },
                _ => rsx! {},
            }
        }
    }
}
