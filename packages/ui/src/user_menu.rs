//! Navigation bar entry for the current session.

use dioxus::prelude::*;

use crate::icons::{FaRightFromBracket, FaUser};
use crate::provider::use_auth;
use crate::Icon;

/// "Login" link when signed out; name and sign-out button when signed in.
#[component]
pub fn UserMenu() -> Element {
    let ctx = use_auth();
    let state = (ctx.state)();
    let auth_path = ctx.controller.settings().auth_path.clone();

    // Reloads whenever the signed-in user changes
    let avatar = use_resource({
        let ctx = ctx.clone();
        move || {
            let controller = ctx.controller.clone();
            let signed_in = (ctx.state)().is_signed_in();
            async move {
                if !signed_in {
                    return None;
                }
                controller.profile().await.map(|record| record.avatar_url())
            }
        }
    });

    if state.loading {
        return rsx! {};
    }

    let label = state.nav_label();
    if !state.is_signed_in() {
        return rsx! {
            a {
                class: "nav-link nav-login",
                href: "{auth_path}",
                Icon { icon: FaUser, width: 14, height: 14 }
                " {label}"
            }
        };
    }

    let busy = ctx.is_busy(auth::Workflow::SignOut);
    let on_sign_out = {
        let ctx = ctx.clone();
        move |_| {
            let ctx = ctx.clone();
            async move {
                let outcome = ctx.controller.sign_out().await;
                ctx.settle(&outcome);
            }
        }
    };

    rsx! {
        div {
            class: "user-menu",
            span {
                class: "user-name",
                if let Some(Some(src)) = avatar() {
                    img { class: "user-avatar", src, alt: "" }
                } else {
                    Icon { icon: FaUser, width: 14, height: 14 }
                }
                " {label}"
            }
            button {
                class: "btn btn-link",
                title: "Sign out",
                disabled: busy,
                onclick: on_sign_out,
                Icon { icon: FaRightFromBracket, width: 14, height: 14 }
                " Sign out"
            }
        }
    }
}
