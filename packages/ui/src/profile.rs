//! Profile editor and preferences for the signed-in user.

use auth::{Field, FieldValidationState, ProfileInput, Workflow};
use chrono::Utc;
use dioxus::prelude::*;
use store::{Preferences, UserStats};

use crate::forms::{show_report, FormField};
use crate::provider::use_auth;

#[component]
pub fn ProfileForm() -> Element {
    let ctx = use_auth();
    let mut first_name = use_signal(String::new);
    let mut last_name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut phone = use_signal(String::new);
    let mut company = use_signal(String::new);
    let mut designation = use_signal(String::new);
    let mut location = use_signal(String::new);
    let first_name_status = use_signal(FieldValidationState::default);
    let last_name_status = use_signal(FieldValidationState::default);
    let email_status = use_signal(FieldValidationState::default);
    let phone_status = use_signal(FieldValidationState::default);
    let mut stats = use_signal(|| None::<UserStats>);
    let busy = ctx.is_busy(Workflow::Profile);

    // Prefill from the stored record
    let _loader = use_resource({
        let ctx = ctx.clone();
        move || {
            let controller = ctx.controller.clone();
            async move {
                if let Some(record) = controller.profile().await {
                    stats.set(Some(record.stats(Utc::now())));
                    first_name.set(record.first_name);
                    last_name.set(record.last_name);
                    email.set(record.email);
                    phone.set(record.phone);
                    company.set(record.company);
                    designation.set(record.designation);
                    location.set(record.location);
                }
            }
        }
    });

    let handle_save = {
        let ctx = ctx.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let ctx = ctx.clone();
            spawn(async move {
                let input = ProfileInput {
                    first_name: first_name(),
                    last_name: last_name(),
                    email: email(),
                    phone: phone(),
                    company: company(),
                    designation: designation(),
                    location: location(),
                };
                let outcome = ctx.controller.save_profile(&input).await;
                if let Some(report) = outcome.report() {
                    show_report(
                        report,
                        &mut [
                            (Field::FirstName, first_name_status),
                            (Field::LastName, last_name_status),
                            (Field::Email, email_status),
                            (Field::Phone, phone_status),
                        ],
                    );
                }
                ctx.settle(&outcome);
            });
        }
    };

    if !ctx.state.read().is_signed_in() {
        return rsx! {
            p { class: "form-hint", "Sign in to edit your profile." }
        };
    }

    rsx! {
        if let Some(stats) = stats() {
            ProfileStats { stats }
        }
        form {
            class: "profile-form",
            onsubmit: handle_save,
            div {
                class: "form-row",
                FormField {
                    field: Field::FirstName,
                    label: "First name",
                    value: first_name,
                    status: first_name_status,
                }
                FormField {
                    field: Field::LastName,
                    label: "Last name",
                    value: last_name,
                    status: last_name_status,
                }
            }
            FormField {
                field: Field::Email,
                label: "Email",
                input_type: "email",
                value: email,
                status: email_status,
            }
            FormField {
                field: Field::Phone,
                label: "Phone",
                input_type: "tel",
                required: false,
                value: phone,
                status: phone_status,
            }
            div {
                class: "form-group",
                label { r#for: "company", "Company" }
                input {
                    id: "company",
                    value: company(),
                    oninput: move |evt: FormEvent| company.set(evt.value()),
                }
            }
            div {
                class: "form-group",
                label { r#for: "designation", "Designation" }
                input {
                    id: "designation",
                    value: designation(),
                    oninput: move |evt: FormEvent| designation.set(evt.value()),
                }
            }
            div {
                class: "form-group",
                label { r#for: "location", "Location" }
                input {
                    id: "location",
                    value: location(),
                    oninput: move |evt: FormEvent| location.set(evt.value()),
                }
            }
            button {
                class: "btn btn-primary",
                r#type: "submit",
                disabled: busy,
                if busy { "Saving..." } else { "Save Profile" }
            }
        }
    }
}

#[component]
fn ProfileStats(stats: UserStats) -> Element {
    let logins = stats.login_count.to_string();
    let member_days = stats.days_since_registration.to_string();
    let last_login_days = stats.days_since_last_login.to_string();
    let completeness = if stats.profile_complete {
        "Profile complete"
    } else {
        "Profile incomplete"
    };

    rsx! {
        div {
            class: "profile-stats",
            div {
                class: "stat",
                span { class: "stat-value", "{logins}" }
                span { class: "stat-label", "Logins" }
            }
            div {
                class: "stat",
                span { class: "stat-value", "{member_days}" }
                span { class: "stat-label", "Days as member" }
            }
            div {
                class: "stat",
                span { class: "stat-value", "{last_login_days}" }
                span { class: "stat-label", "Days since last login" }
            }
            span { class: "badge", "{completeness}" }
        }
    }
}

const THEMES: [(&str, &str); 2] = [("dark", "Dark"), ("light", "Light")];
const LANGUAGES: [(&str, &str); 3] = [("en", "English"), ("hi", "Hindi"), ("bn", "Bengali")];

/// Newsletter, notification, theme and language settings.
#[component]
pub fn PreferencesForm() -> Element {
    let ctx = use_auth();
    let mut preferences = use_signal(Preferences::default);
    let busy = ctx.is_busy(Workflow::Preferences);

    let _loader = use_resource({
        let ctx = ctx.clone();
        move || {
            let controller = ctx.controller.clone();
            async move {
                if let Some(record) = controller.profile().await {
                    preferences.set(record.preferences);
                }
            }
        }
    });

    let handle_save = {
        let ctx = ctx.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let ctx = ctx.clone();
            spawn(async move {
                let outcome = ctx.controller.save_preferences(&preferences()).await;
                ctx.settle(&outcome);
            });
        }
    };

    if !ctx.state.read().is_signed_in() {
        return rsx! {};
    }
    let current = preferences();

    rsx! {
        form {
            class: "preferences-form",
            onsubmit: handle_save,
            h3 { "Preferences" }
            label {
                class: "checkbox",
                input {
                    r#type: "checkbox",
                    checked: current.newsletter,
                    onchange: move |evt: FormEvent| {
                        preferences.write().newsletter = evt.checked();
                    },
                }
                " Email newsletter"
            }
            label {
                class: "checkbox",
                input {
                    r#type: "checkbox",
                    checked: current.notifications,
                    onchange: move |evt: FormEvent| {
                        preferences.write().notifications = evt.checked();
                    },
                }
                " Notifications"
            }
            div {
                class: "form-group",
                label { r#for: "theme", "Theme" }
                select {
                    id: "theme",
                    value: current.theme.clone(),
                    onchange: move |evt: FormEvent| preferences.write().theme = evt.value(),
                    for (value, label) in THEMES {
                        option { value, "{label}" }
                    }
                }
            }
            div {
                class: "form-group",
                label { r#for: "language", "Language" }
                select {
                    id: "language",
                    value: current.language.clone(),
                    onchange: move |evt: FormEvent| preferences.write().language = evt.value(),
                    for (value, label) in LANGUAGES {
                        option { value, "{label}" }
                    }
                }
            }
            button {
                class: "btn btn-primary",
                r#type: "submit",
                disabled: busy,
                if busy { "Saving..." } else { "Save Preferences" }
            }
        }
    }
}
