//! The single notification toast.

use auth::{NotificationKind, NotificationState};
use dioxus::prelude::*;

use crate::icons::{
    FaCircleCheck, FaCircleExclamation, FaCircleInfo, FaTriangleExclamation, FaXmark,
};
use crate::provider::use_auth;
use crate::Icon;

#[component]
fn KindIcon(kind: NotificationKind) -> Element {
    match kind {
        NotificationKind::Success => rsx! {
            Icon { icon: FaCircleCheck, width: 18, height: 18 }
        },
        NotificationKind::Error => rsx! {
            Icon { icon: FaCircleExclamation, width: 18, height: 18 }
        },
        NotificationKind::Warning => rsx! {
            Icon { icon: FaTriangleExclamation, width: 18, height: 18 }
        },
        NotificationKind::Info => rsx! {
            Icon { icon: FaCircleInfo, width: 18, height: 18 }
        },
    }
}

/// Renders whatever the presenter currently holds.
#[component]
pub fn NotificationToast() -> Element {
    let ctx = use_auth();
    let state = (ctx.notification)();

    let (notification, visibility) = match &state {
        NotificationState::Idle => return rsx! {},
        NotificationState::Showing(n) => (n, "show"),
        NotificationState::Hiding(n) => (n, "hide"),
    };
    let kind = notification.kind;
    let message = notification.message.clone();
    let class = format!("notification notification-{} {}", kind.name(), visibility);
    let icon_class = format!("notification-icon {}", kind.icon());

    rsx! {
        div {
            class: "{class}",
            role: "status",
            div {
                class: "notification-content",
                span {
                    class: "{icon_class}",
                    KindIcon { kind }
                }
                span { class: "notification-message", "{message}" }
                button {
                    class: "notification-close",
                    title: "Dismiss",
                    onclick: move |_| ctx.dismiss_notification(),
                    Icon { icon: FaXmark, width: 12, height: 12 }
                }
            }
        }
    }
}
