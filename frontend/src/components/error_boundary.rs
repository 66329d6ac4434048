//! Error boundaries for the page layout and for individual widgets.

use dioxus::prelude::*;

/// Catches render failures of a whole page area and offers a way home.
#[component]
pub fn GlobalErrorBoundary(boundary_name: ReadSignal<String>, children: Element) -> Element {
    rsx! {
        ErrorBoundary {
            handle_error: move |err: ErrorContext| {
                dioxus::logger::tracing::error!("Render failure in {}: {:?}", boundary_name.read(), err.error());
                rsx! {
                    div {
                        style: "margin: 15px; padding: 10px; border: 1px solid red; border-radius: 5px;",
                        h1 { style: "color:red; font-size: 40px;", "Something went wrong" }
                        p { style: "color:darkred; font-size: 20px;", "Area: {boundary_name}" }
                        a {
                            href: "/",
                            style: "color:blue; font-size: 20px;",
                            "Return to Home Page"
                        }
                        pre { style: "text-wrap: auto;", "{err:#?}" }
                    }
                }
            },
            children
        }
    }
}

/// Keeps a failing widget from taking the page down; the user can retry it.
#[component]
pub fn ComponentErrorBoundary(children: Element) -> Element {
    rsx! {
        ErrorBoundary {
            handle_error: |err: ErrorContext| {
                let error_txt = match err.error() {
                    Some(e) => format!("{:#?}", e.0),
                    None => "Unknown error".to_string(),
                };
                rsx! {
                    ComponentErrorDisplay {
                        error_txt,
                        button {
                            class: "x-filter-button",
                            onclick: move |_| err.clear_errors(),
                            "Try Again"
                        }
                    }
                }
            },
            {children}
        }
    }
}

#[component]
pub fn ComponentErrorDisplay(error_txt: ReadSignal<String>, children: Element) -> Element {
    rsx! {
        div {
            style: "
                display: flex;
                flex-direction: column;
                align-items: center;
                gap: 8px;
                padding: 10px;
            ",
            h3 { style: "color:red;", "Could not load" }
            pre {
                style: "color:darkred; border: 1px solid red; padding: 10px; border-radius: 5px; text-wrap: auto; max-width: 600px; max-height: 300px; overflow-y: auto;",
                "{error_txt}"
            }
            {children}
        }
    }
}
