use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::md_navigation_icons::{MdExpandLess, MdExpandMore};

use crate::components::filter_components::FilterFormContext;
use crate::components::filter_components::filter_field::FilterField;

/// A collapsible section. Its fields are laid out in rows of twelve columns.
#[component]
pub fn FilterSection(section_id: ReadSignal<String>) -> Element {
    let ctx = use_context::<FilterFormContext>();
    let mut expansion = ctx.expansion;
    let id = section_id.read().clone();
    let Some(section) = ctx.controller.form().section(&id) else {
        dioxus::logger::tracing::warn!("Unknown section: {id}");
        return rsx! {};
    };
    let is_open = expansion.read().is_open(&id);

    rsx! {
        div {
            class: "x-filter-section",
            style: "border-left: 4px solid {section.color_tag};",
            div {
                class: "x-filter-section-header",
                onclick: move |_| {
                    expansion.write().toggle(&section_id.read());
                },
                span { "{section.title}" }
                div { style: "flex-grow:1;" }
                if is_open {
                    Icon { icon: MdExpandLess, style: "width: 24px; height: 24px;" }
                } else {
                    Icon { icon: MdExpandMore, style: "width: 24px; height: 24px;" }
                }
            }
            if is_open {
                for (row_index, row) in section.rows().into_iter().enumerate() {
                    div {
                        key: "{row_index}",
                        class: "x-filter-row",
                        for field in row {
                            div {
                                key: "{field.field_name}",
                                style: "grid-column: span {field.column_span};",
                                FilterField { field_name: field.field_name.clone() }
                            }
                        }
                    }
                }
            }
        }
    }
}
