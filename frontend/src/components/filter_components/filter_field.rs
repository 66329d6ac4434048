use common::{
    filter_codec::{FilterValue, is_all_sentinel, is_emptiness_sentinel},
    form_schema::{ComponentKind, DataSourceOption},
};
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::md_navigation_icons::MdArrowDropDown;
use dioxus_free_icons::icons::md_toggle_icons::{MdCheckBox, MdCheckBoxOutlineBlank};

use crate::components::filter_components::FilterFormContext;
use crate::components::filter_components::quick_search_box::QuickSearchBox;

/// Renders one field with the widget its component kind calls for.
#[component]
pub fn FilterField(field_name: ReadSignal<String>) -> Element {
    let ctx = use_context::<FilterFormContext>();
    let name = field_name.read().clone();
    let Some(field) = ctx.controller.form().field(&name) else {
        dioxus::logger::tracing::warn!("Unknown field: {name}");
        return rsx! {};
    };

    rsx! {
        label {
            class: "x-filter-field",
            span { class: "x-filter-field-label", "{field.label}" }
            match field.component_kind {
                ComponentKind::Text => rsx! { TextInput { field_name: name.clone() } },
                ComponentKind::SingleSelect => rsx! { SingleSelect { field_name: name.clone() } },
                ComponentKind::MultiSelect => rsx! { MultiSelect { field_name: name.clone() } },
                ComponentKind::Autocomplete => rsx! { QuickSearchBox { field_name: name.clone() } },
                ComponentKind::Composite => rsx! { CompositeInput { field_name: name.clone() } },
            }
        }
    }
}

const SHARED_FETCH_POLL_MS: u32 = 100;

/// Options of a select-style field: the static ones first, then whatever its
/// data source returns. The source is only asked once the user opens the field.
#[derive(Clone, Copy)]
pub(crate) struct FieldOptions {
    pub options: Signal<Vec<DataSourceOption>>,
    pub loading: Signal<bool>,
    pub load: Callback<()>,
}

pub(crate) fn use_field_options(field_name: &str) -> FieldOptions {
    let ctx = use_context::<FilterFormContext>();
    let field = ctx.controller.form().field(field_name);
    let static_options = field.and_then(|f| f.static_options.clone()).unwrap_or_default();
    let source = field.and_then(|f| f.data_source_name.clone());

    let initial = {
        let cached = source.as_deref().map(|s| ctx.cache.options(s)).unwrap_or_default();
        merge_options(&static_options, cached)
    };
    let mut options = use_signal(move || initial);
    let mut loading = use_signal(|| false);
    let cache = ctx.cache.clone();
    let load = use_callback(move |_: ()| {
        let Some(source) = source.clone() else {
            return;
        };
        if loading() {
            return;
        }
        let cache = cache.clone();
        let static_options = static_options.clone();
        loading.set(true);
        spawn(async move {
            let mut fetched = cache.request(&source).await;
            // another field on the same source started the fetch; wait for its reply
            while cache.is_loading(&source) {
                gloo_timers::future::TimeoutFuture::new(SHARED_FETCH_POLL_MS).await;
                fetched = cache.options(&source);
            }
            options.set(merge_options(&static_options, fetched));
            loading.set(false);
        });
    });
    FieldOptions { options, loading, load }
}

fn merge_options(static_options: &[DataSourceOption], fetched: Vec<DataSourceOption>) -> Vec<DataSourceOption> {
    let mut merged = static_options.to_vec();
    for option in fetched {
        if !merged.iter().any(|o| o.value == option.value) {
            merged.push(option);
        }
    }
    merged
}

/// A single select always leads with its own blank "All" choice, so "All"
/// entries among the options are left out.
fn single_select_choices(options: &[DataSourceOption]) -> Vec<DataSourceOption> {
    options.iter().filter(|o| !is_all_sentinel(&o.value)).cloned().collect()
}

fn label_for(options: &[DataSourceOption], value: &str) -> String {
    options
        .iter()
        .find(|o| o.value == value)
        .map(|o| o.label.clone())
        .unwrap_or_else(|| value.to_string())
}

#[component]
fn TextInput(field_name: ReadSignal<String>) -> Element {
    let ctx = use_context::<FilterFormContext>();
    let _revision = ctx.revision.read();
    let name = field_name.read().clone();
    let current = ctx.controller.selections(&name).into_iter().next().unwrap_or_default();
    let placeholder = ctx.controller.form().field(&name).and_then(|f| f.placeholder.clone()).unwrap_or_default();
    let controller = ctx.controller.clone();
    rsx! {
        input {
            r#type: "text",
            class: "x-filter-input",
            placeholder: "{placeholder}",
            value: "{current}",
            oninput: move |e| {
                controller.set_field_value(&field_name.read(), FilterValue::Single(e.value()));
            },
        }
    }
}

#[component]
fn SingleSelect(field_name: ReadSignal<String>) -> Element {
    let ctx = use_context::<FilterFormContext>();
    let _revision = ctx.revision.read();
    let name = field_name.read().clone();
    let field_options = use_field_options(&name);
    let current = ctx.controller.selections(&name).into_iter().next().unwrap_or_default();
    let controller = ctx.controller.clone();
    rsx! {
        select {
            class: "x-filter-input",
            onfocus: move |_| field_options.load.call(()),
            onchange: move |e| {
                controller.select_option(&field_name.read(), &e.value());
            },
            option { value: "", selected: current.is_empty(), "All" }
            for opt in single_select_choices(&field_options.options.read()) {
                option {
                    key: "{opt.value}",
                    value: "{opt.value}",
                    selected: opt.value == current,
                    "{opt.label}"
                }
            }
            if (field_options.loading)() {
                option { disabled: true, "Loading..." }
            }
        }
    }
}

#[component]
fn MultiSelect(field_name: ReadSignal<String>) -> Element {
    let ctx = use_context::<FilterFormContext>();
    let _revision = ctx.revision.read();
    let name = field_name.read().clone();
    let field_options = use_field_options(&name);
    let mut is_open = use_signal(|| false);
    let selections = ctx.controller.selections(&name);
    let button_text = match selections.as_slice() {
        [] => "All".to_string(),
        [only] => label_for(&field_options.options.read(), only),
        many => format!("{} selected", many.len()),
    };
    let controller = ctx.controller.clone();

    rsx! {
        button {
            class: "x-filter-input x-filter-dropdown",
            onclick: move |e| {
                e.prevent_default();
                if !is_open() {
                    field_options.load.call(());
                }
                is_open.set(!is_open());
            },
            span { "{button_text}" }
            Icon { icon: MdArrowDropDown, style: "width: 20px; height: 20px;" }
        }
        if is_open() {
            ul {
                class: "x-filter-option-list",
                if (field_options.loading)() {
                    li { "Loading..." }
                }
                for opt in field_options.options.read().iter() {
                    OptionCheckbox {
                        key: "{opt.value}",
                        checked: selections.contains(&opt.value),
                        label: opt.label.clone(),
                        on_click: {
                            let controller = controller.clone();
                            let value = opt.value.clone();
                            move |_| controller.select_option(&field_name.read(), &value)
                        },
                    }
                }
            }
        }
    }
}

#[component]
fn OptionCheckbox(checked: bool, label: String, on_click: EventHandler<()>) -> Element {
    rsx! {
        li {
            class: "x-filter-option",
            onclick: move |_| on_click.call(()),
            if checked {
                Icon { icon: MdCheckBox, style: "width: 22px; height: 22px; flex-shrink: 0;" }
            } else {
                Icon { icon: MdCheckBoxOutlineBlank, style: "width: 22px; height: 22px; flex-shrink: 0;" }
            }
            span { "{label}" }
        }
    }
}

/// Free text matched by prefix, or one of the emptiness conditions.
#[component]
fn CompositeInput(field_name: ReadSignal<String>) -> Element {
    let ctx = use_context::<FilterFormContext>();
    let _revision = ctx.revision.read();
    let name = field_name.read().clone();
    let field_options = use_field_options(&name);
    let current = ctx.controller.selections(&name).into_iter().next().unwrap_or_default();
    let condition = if is_emptiness_sentinel(&current) { current.clone() } else { String::new() };
    let text = if condition.is_empty() { current } else { String::new() };
    let text_controller = ctx.controller.clone();
    let condition_controller = ctx.controller.clone();

    rsx! {
        div {
            style: "display:flex; flex-direction: row; gap: 6px;",
            input {
                r#type: "text",
                class: "x-filter-input",
                style: "flex-grow:1;",
                disabled: !condition.is_empty(),
                value: "{text}",
                oninput: move |e| {
                    text_controller.set_field_value(&field_name.read(), FilterValue::Single(e.value()));
                },
            }
            select {
                class: "x-filter-input",
                onchange: move |e| {
                    condition_controller.select_option(&field_name.read(), &e.value());
                },
                option { value: "", selected: condition.is_empty(), "Starts with" }
                for opt in field_options.options.read().iter() {
                    option {
                        key: "{opt.value}",
                        value: "{opt.value}",
                        selected: opt.value == condition,
                        "{opt.label}"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_options_come_first_and_are_not_repeated() {
        let merged = merge_options(
            &[DataSourceOption::plain("All Reps")],
            vec![DataSourceOption::new("170", "Ada"), DataSourceOption::plain("All Reps")],
        );
        let values: Vec<_> = merged.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["All Reps", "170"]);
    }

    #[test]
    fn single_select_lists_all_only_once() {
        let choices = single_select_choices(&[
            DataSourceOption::plain("All"),
            DataSourceOption::plain("High"),
            DataSourceOption::plain("Low"),
        ]);
        let values: Vec<_> = choices.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["High", "Low"]);
    }

    #[test]
    fn labels_fall_back_to_the_raw_value() {
        let options = vec![DataSourceOption::new("170", "Ada")];
        assert_eq!(label_for(&options, "170"), "Ada");
        assert_eq!(label_for(&options, "999"), "999");
    }
}
