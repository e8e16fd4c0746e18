//! Landing page contact form.

use auth::{ContactInput, Field, FieldValidationState, Workflow};
use dioxus::prelude::*;

use crate::forms::{reset_fields, show_report, FormField};
use crate::provider::use_auth;

const SERVICES: [&str; 5] = [
    "Web Development",
    "Mobile Apps",
    "AI Solutions",
    "Cloud Services",
    "Consulting",
];

#[component]
pub fn ContactForm() -> Element {
    let ctx = use_auth();
    let name = use_signal(String::new);
    let email = use_signal(String::new);
    let phone = use_signal(String::new);
    let mut service = use_signal(String::new);
    let message = use_signal(String::new);
    let name_status = use_signal(FieldValidationState::default);
    let email_status = use_signal(FieldValidationState::default);
    let phone_status = use_signal(FieldValidationState::default);
    let service_status = use_signal(FieldValidationState::default);
    let mut message_status = use_signal(FieldValidationState::default);
    let busy = ctx.is_busy(Workflow::Contact);

    let handle_submit = {
        let ctx = ctx.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let ctx = ctx.clone();
            spawn(async move {
                let input = ContactInput {
                    name: name(),
                    email: email(),
                    phone: phone(),
                    service: service(),
                    message: message(),
                };
                let outcome = ctx.controller.submit_contact(&input).await;
                if let Some(report) = outcome.report() {
                    show_report(
                        report,
                        &mut [
                            (Field::Name, name_status),
                            (Field::Email, email_status),
                            (Field::Phone, phone_status),
                            (Field::Service, service_status),
                            (Field::Message, message_status),
                        ],
                    );
                } else if outcome.is_success() {
                    reset_fields(&mut [
                        (name, name_status),
                        (email, email_status),
                        (phone, phone_status),
                        (service, service_status),
                        (message, message_status),
                    ]);
                }
                ctx.settle(&outcome);
            });
        }
    };

    let service_error = match service_status() {
        FieldValidationState::Invalid(message) => Some(message),
        _ => None,
    };
    let message_error = match message_status() {
        FieldValidationState::Invalid(message) => Some(message),
        _ => None,
    };

    rsx! {
        form {
            class: "contact-form",
            onsubmit: handle_submit,
            FormField { field: Field::Name, label: "Name", value: name, status: name_status }
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
                label { r#for: "service", "Service" }
                select {
                    id: "service",
                    name: "service",
                    value: service(),
                    onchange: move |evt: FormEvent| service.set(evt.value()),
                    option { value: "", "Select a service" }
                    for option_name in SERVICES {
                        option { value: option_name, "{option_name}" }
                    }
                }
                if let Some(error) = service_error {
                    span { class: "error-message", "{error}" }
                }
            }
            div {
                class: "form-group",
                label { r#for: "message", "Message" }
                textarea {
                    id: "message",
                    name: "message",
                    rows: 5,
                    value: message(),
                    oninput: move |evt: FormEvent| {
                        let mut message = message;
                        message.set(evt.value());
                    },
                    onblur: move |_| {
                        message_status.set(auth::validate_field(Field::Message, &message(), true));
                    },
                }
                if let Some(error) = message_error {
                    span { class: "error-message", "{error}" }
                }
            }
            button {
                class: "btn btn-primary",
                r#type: "submit",
                disabled: busy,
                if busy { "Sending..." } else { "Send Message" }
            }
        }
    }
}
