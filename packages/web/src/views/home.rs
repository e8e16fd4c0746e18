//! Landing page.

use dioxus::prelude::*;
use ui::{use_auth, ContactForm, PreferencesForm, ProfileForm, UserMenu};

const SERVICES: [(&str, &str); 4] = [
    ("Web Development", "Fast, accessible sites and web applications."),
    ("Mobile Apps", "Native-feeling apps for iOS and Android."),
    ("AI Solutions", "Assistants and automation built on your data."),
    ("Cloud Services", "Hosting, scaling and operations you don't have to think about."),
];

#[component]
pub fn Home() -> Element {
    let ctx = use_auth();
    let site_name = ctx.controller.settings().site_name.clone();
    let signed_in = ctx.state.read().is_signed_in();

    rsx! {
        nav {
            class: "navbar",
            a { class: "nav-brand", href: "/", "{site_name}" }
            div {
                class: "nav-links",
                a { class: "nav-link", href: "#services", "Services" }
                a { class: "nav-link", href: "#contact", "Contact" }
                UserMenu {}
            }
        }

        section {
            class: "hero",
            h1 { class: "hero-title", "Building what's next with {site_name}" }
            p { class: "hero-subtitle", "Design, engineering and AI for teams that move quickly." }
            a { class: "btn btn-primary", href: "#contact", "Start a project" }
        }

        section {
            id: "services",
            class: "services",
            h2 { "Services" }
            div {
                class: "services-grid",
                for (title, blurb) in SERVICES {
                    div {
                        class: "service-card",
                        h3 { "{title}" }
                        p { "{blurb}" }
                    }
                }
            }
        }

        if signed_in {
            section {
                id: "profile",
                class: "profile",
                h2 { "Your profile" }
                ProfileForm {}
                PreferencesForm {}
            }
        }

        section {
            id: "contact",
            class: "contact",
            h2 { "Get in touch" }
            ContactForm {}
        }

        footer {
            class: "footer",
            "© {site_name}"
        }
    }
}
