//! Login, signup and password reset page.

use dioxus::prelude::*;
use ui::{use_auth, AuthPanel};

use crate::Route;

#[component]
pub fn AuthPage() -> Element {
    let ctx = use_auth();
    let state = (ctx.state)();
    let site_name = ctx.controller.settings().site_name.clone();
    let label = state.nav_label();

    rsx! {
        div {
            class: "auth-container",
            Link { class: "nav-brand", to: Route::Home {}, "{site_name}" }
            if !state.loading && state.is_signed_in() {
                p {
                    class: "form-hint",
                    "You're signed in as {label}. "
                    Link { to: Route::Home {}, "Back to the home page" }
                }
            }
            AuthPanel {}
        }
    }
}
