//! Login, signup and password reset forms with live field validation.

use auth::{
    validate_field, AuthForm, Credentials, Field, FieldValidationState, PasswordResetInput,
    SignupInput, ValidationReport, Workflow,
};
use dioxus::prelude::*;

use crate::icons::{FaEye, FaEyeSlash, FaGoogle, FaSpinner};
use crate::provider::use_auth;
use crate::Icon;

/// Revealed password inputs render as plain text.
fn shown_input_type(input_type: &str, revealed: bool) -> &str {
    if input_type == "password" && revealed {
        "text"
    } else {
        input_type
    }
}

/// One labelled input. Validates itself on blur. Password inputs get a
/// show/hide toggle.
#[component]
pub fn FormField(
    field: Field,
    label: String,
    value: Signal<String>,
    status: Signal<FieldValidationState>,
    #[props(default = "text".to_string())] input_type: String,
    #[props(default = true)] required: bool,
    #[props(default)] placeholder: String,
) -> Element {
    let mut value = value;
    let mut status = status;
    let mut revealed = use_signal(|| false);
    let is_password = input_type == "password";
    let shown_type = shown_input_type(&input_type, revealed()).to_string();
    let toggle_title = if revealed() { "Hide password" } else { "Show password" };
    let class = match status() {
        FieldValidationState::Untouched => "form-group",
        FieldValidationState::Valid => "form-group success",
        FieldValidationState::Invalid(_) => "form-group error",
    };

    rsx! {
        div {
            class: "{class}",
            label { r#for: field.name(), "{label}" }
            div {
                class: "input-wrapper",
                input {
                    id: field.name(),
                    name: field.name(),
                    r#type: "{shown_type}",
                    placeholder: "{placeholder}",
                    value: value(),
                    oninput: move |evt: FormEvent| {
                        value.set(evt.value());
                        if matches!(status(), FieldValidationState::Invalid(_)) {
                            status.set(FieldValidationState::Untouched);
                        }
                    },
                    onblur: move |_| status.set(validate_field(field, &value(), required)),
                }
                if is_password {
                    button {
                        class: "password-toggle",
                        r#type: "button",
                        title: toggle_title,
                        onclick: move |_| revealed.set(!revealed()),
                        if revealed() {
                            Icon { icon: FaEyeSlash, width: 14, height: 14 }
                        } else {
                            Icon { icon: FaEye, width: 14, height: 14 }
                        }
                    }
                }
            }
            if let FieldValidationState::Invalid(message) = status() {
                span { class: "error-message", "{message}" }
            }
        }
    }
}

/// Mark every listed field valid or invalid according to a submit-time report.
pub(crate) fn show_report(
    report: &ValidationReport,
    fields: &mut [(Field, Signal<FieldValidationState>)],
) {
    for (field, status) in fields.iter_mut() {
        status.set(match report.error(*field) {
            Some(message) => FieldValidationState::Invalid(message.to_string()),
            None => FieldValidationState::Valid,
        });
    }
}

pub(crate) fn reset_fields(fields: &mut [(Signal<String>, Signal<FieldValidationState>)]) {
    for (value, status) in fields.iter_mut() {
        value.set(String::new());
        status.set(FieldValidationState::Untouched);
    }
}

#[component]
fn SubmitButton(busy: bool, label: String, busy_label: String) -> Element {
    let class = if busy { "btn btn-primary loading" } else { "btn btn-primary" };
    rsx! {
        button {
            class: "{class}",
            r#type: "submit",
            disabled: busy,
            if busy {
                Icon { icon: FaSpinner, width: 14, height: 14 }
                " {busy_label}"
            } else {
                "{label}"
            }
        }
    }
}

#[component]
pub fn LoginForm() -> Element {
    let ctx = use_auth();
    let mut active_form = ctx.active_form;
    let email = use_signal(String::new);
    let password = use_signal(String::new);
    let mut remember = use_signal(|| false);
    let email_status = use_signal(FieldValidationState::default);
    let password_status = use_signal(FieldValidationState::default);
    let busy = ctx.is_busy(Workflow::Login);

    let handle_login = {
        let ctx = ctx.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let ctx = ctx.clone();
            spawn(async move {
                let input = Credentials {
                    email: email(),
                    password: password(),
                    remember_session: remember(),
                };
                let outcome = ctx.controller.login(&input).await;
                if let Some(report) = outcome.report() {
                    show_report(
                        report,
                        &mut [(Field::Email, email_status), (Field::Password, password_status)],
                    );
                }
                ctx.settle(&outcome);
            });
        }
    };

    rsx! {
        form {
            class: "auth-form",
            onsubmit: handle_login,
            h2 { "Welcome back" }
            FormField {
                field: Field::Email,
                label: "Email",
                input_type: "email",
                value: email,
                status: email_status,
            }
            FormField {
                field: Field::Password,
                label: "Password",
                input_type: "password",
                value: password,
                status: password_status,
            }
            div {
                class: "form-options",
                label {
                    class: "checkbox",
                    input {
                        r#type: "checkbox",
                        checked: remember(),
                        onchange: move |evt: FormEvent| remember.set(evt.checked()),
                    }
                    " Remember me"
                }
                a {
                    href: "#",
                    onclick: move |evt: MouseEvent| {
                        evt.prevent_default();
                        active_form.set(AuthForm::Reset);
                    },
                    "Forgot password?"
                }
            }
            SubmitButton { busy, label: "Sign In", busy_label: "Signing in..." }
            GoogleButton {}
            p {
                class: "form-switch",
                "Don't have an account? "
                a {
                    href: "#",
                    onclick: move |evt: MouseEvent| {
                        evt.prevent_default();
                        active_form.set(AuthForm::Signup);
                    },
                    "Sign up"
                }
            }
        }
    }
}

#[component]
pub fn SignupForm() -> Element {
    let ctx = use_auth();
    let mut active_form = ctx.active_form;
    let first_name = use_signal(String::new);
    let last_name = use_signal(String::new);
    let email = use_signal(String::new);
    let password = use_signal(String::new);
    let confirm_password = use_signal(String::new);
    let mut agree = use_signal(|| false);
    let first_name_status = use_signal(FieldValidationState::default);
    let last_name_status = use_signal(FieldValidationState::default);
    let email_status = use_signal(FieldValidationState::default);
    let password_status = use_signal(FieldValidationState::default);
    let confirm_status = use_signal(FieldValidationState::default);
    let busy = ctx.is_busy(Workflow::Signup);

    let handle_signup = {
        let ctx = ctx.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let ctx = ctx.clone();
            spawn(async move {
                let input = SignupInput {
                    first_name: first_name(),
                    last_name: last_name(),
                    email: email(),
                    password: password(),
                    confirm_password: confirm_password(),
                    agree_to_terms: agree(),
                };
                let outcome = ctx.controller.signup(&input).await;
                if let Some(report) = outcome.report() {
                    show_report(
                        report,
                        &mut [
                            (Field::FirstName, first_name_status),
                            (Field::LastName, last_name_status),
                            (Field::Email, email_status),
                            (Field::Password, password_status),
                            (Field::ConfirmPassword, confirm_status),
                        ],
                    );
                } else if outcome.is_success() {
                    reset_fields(&mut [
                        (first_name, first_name_status),
                        (last_name, last_name_status),
                        (email, email_status),
                        (password, password_status),
                        (confirm_password, confirm_status),
                    ]);
                    agree.set(false);
                }
                ctx.settle(&outcome);
            });
        }
    };

    rsx! {
        form {
            class: "auth-form",
            onsubmit: handle_signup,
            h2 { "Create your account" }
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
                field: Field::Password,
                label: "Password",
                input_type: "password",
                value: password,
                status: password_status,
            }
            FormField {
                field: Field::ConfirmPassword,
                label: "Confirm password",
                input_type: "password",
                value: confirm_password,
                status: confirm_status,
            }
            label {
                class: "checkbox",
                input {
                    r#type: "checkbox",
                    checked: agree(),
                    onchange: move |evt: FormEvent| agree.set(evt.checked()),
                }
                " I agree to the Terms of Service and Privacy Policy"
            }
            SubmitButton { busy, label: "Create Account", busy_label: "Creating account..." }
            GoogleButton {}
            p {
                class: "form-switch",
                "Already have an account? "
                a {
                    href: "#",
                    onclick: move |evt: MouseEvent| {
                        evt.prevent_default();
                        active_form.set(AuthForm::Login);
                    },
                    "Sign in"
                }
            }
        }
    }
}

#[component]
pub fn ResetForm() -> Element {
    let ctx = use_auth();
    let mut active_form = ctx.active_form;
    let email = use_signal(String::new);
    let email_status = use_signal(FieldValidationState::default);
    let busy = ctx.is_busy(Workflow::Reset);

    let handle_reset = {
        let ctx = ctx.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let ctx = ctx.clone();
            spawn(async move {
                let input = PasswordResetInput { email: email() };
                let outcome = ctx.controller.reset_password(&input).await;
                if let Some(report) = outcome.report() {
                    show_report(report, &mut [(Field::Email, email_status)]);
                } else if outcome.is_success() {
                    reset_fields(&mut [(email, email_status)]);
                }
                ctx.settle(&outcome);
            });
        }
    };

    rsx! {
        form {
            class: "auth-form",
            onsubmit: handle_reset,
            h2 { "Reset your password" }
            p { class: "form-hint", "Enter your email and we'll send you a reset link." }
            FormField {
                field: Field::Email,
                label: "Email",
                input_type: "email",
                value: email,
                status: email_status,
            }
            SubmitButton { busy, label: "Send Reset Link", busy_label: "Sending..." }
            p {
                class: "form-switch",
                a {
                    href: "#",
                    onclick: move |evt: MouseEvent| {
                        evt.prevent_default();
                        active_form.set(AuthForm::Login);
                    },
                    "Back to sign in"
                }
            }
        }
    }
}

#[component]
pub fn GoogleButton() -> Element {
    let ctx = use_auth();
    let busy = ctx.is_busy(Workflow::Social);

    let onclick = {
        let ctx = ctx.clone();
        move |_| ctx.start_google_sign_in()
    };

    rsx! {
        button {
            class: "btn btn-google",
            r#type: "button",
            disabled: busy,
            onclick: onclick,
            Icon { icon: FaGoogle, width: 16, height: 16 }
            " Continue with Google"
        }
    }
}

/// The login, signup and reset forms, one visible at a time.
#[component]
pub fn AuthPanel() -> Element {
    let ctx = use_auth();
    let active_form = ctx.active_form;

    rsx! {
        div {
            class: "auth-panel",
            {match active_form() {
                AuthForm::Login => rsx! { LoginForm {} },
                AuthForm::Signup => rsx! { SignupForm {} },
                AuthForm::Reset => rsx! { ResetForm {} },
            }}
        }
    }
}
