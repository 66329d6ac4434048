use dioxus::prelude::*;

use crate::components::error_boundary::ComponentErrorBoundary;

/// Shows a loading line while server calls below it are pending.
#[component]
pub fn SuspendWrapper(children: Element) -> Element {
    rsx! {
        SuspenseBoundary {
            fallback: |_s: SuspenseContext| rsx! { LoadingIndicator {} },
            ComponentErrorBoundary {
                children
            }
        }
    }
}

#[component]
pub fn LoadingIndicator() -> Element {
    rsx! {
        div {
            style: "color:#374151; font-size: 18px; padding: 10px;",
            "Loading..."
        }
    }
}
