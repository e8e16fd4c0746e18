//! # Form validation
//!
//! Pure checks run before any provider call. Each form validator looks at
//! every field in one pass and accumulates errors, so the user sees all the
//! problems with a submission at once.
//!
//! Email syntax is deliberately permissive: something without spaces or `@`,
//! an `@`, more of the same, a dot, and a non-empty tail. It accepts plenty
//! of addresses RFC 5322 would reject (`a@b.c`, `a@b..c`). The provider does
//! the real check.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use store::{profile_is_complete, ProfileUpdate};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").expect("phone pattern is valid"));

pub const MIN_PASSWORD_LEN: usize = 6;

pub const EMAIL_REQUIRED: &str = "Email is required.";
pub const EMAIL_INVALID: &str = "Please enter a valid email address.";
pub const PASSWORD_REQUIRED: &str = "Password is required.";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters long.";
pub const CONFIRM_REQUIRED: &str = "Please confirm your password.";
pub const PASSWORDS_DIFFER: &str = "Passwords do not match.";
pub const PHONE_INVALID: &str = "Please enter a valid phone number.";
pub const TERMS_REQUIRED: &str = "Please agree to the Terms of Service and Privacy Policy.";
pub const CONTACT_INCOMPLETE: &str = "Please fill in all required fields correctly.";

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Phone numbers are checked with whitespace removed.
pub fn is_valid_phone(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE.is_match(&compact)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Password,
    ConfirmPassword,
    Name,
    Phone,
    Service,
    Message,
}

impl Field {
    /// Form input name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Service => "service",
            Self::Message => "message",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FirstName => "First name",
            Self::LastName => "Last name",
            Self::Email => "Email",
            Self::Password => "Password",
            Self::ConfirmPassword => "Confirm password",
            Self::Name => "Name",
            Self::Phone => "Phone",
            Self::Service => "Service",
            Self::Message => "Message",
        }
    }

    fn required_message(&self) -> String {
        format!("{} is required.", self.label())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of validating one form submission.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationReport {
    pub field_errors: BTreeMap<Field, String>,
    /// A form-level message with no field of its own (the terms checkbox).
    pub notice: Option<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty() && self.notice.is_none()
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.field_errors.get(&field).map(String::as_str)
    }

    fn reject(&mut self, field: Field, message: impl Into<String>) {
        self.field_errors.entry(field).or_insert_with(|| message.into());
    }

    fn require(&mut self, field: Field, value: &str, message: &str) -> bool {
        if value.trim().is_empty() {
            self.reject(field, message);
            false
        } else {
            true
        }
    }

    fn check_email(&mut self, email: &str) {
        if self.require(Field::Email, email, EMAIL_REQUIRED) && !is_valid_email(email.trim()) {
            self.reject(Field::Email, EMAIL_INVALID);
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<&str> = self.field_errors.values().map(String::as_str).collect();
        if let Some(notice) = &self.notice {
            parts.push(notice);
        }
        f.write_str(&parts.join(" "))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub remember_session: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignupInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub agree_to_terms: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PasswordResetInput {
    pub email: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContactInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub message: String,
}

/// The editable part of a user's profile, as typed into the form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub designation: String,
    pub location: String,
}

impl ProfileInput {
    /// The store update for this input, with completeness recomputed.
    pub fn to_update(&self) -> ProfileUpdate {
        let first_name = self.first_name.trim().to_string();
        let last_name = self.last_name.trim().to_string();
        let profile_complete = profile_is_complete(
            [&self.first_name, &self.last_name, &self.email].map(String::as_str),
            [&self.phone, &self.company, &self.designation].map(String::as_str),
        );

        ProfileUpdate {
            display_name: Some(format!("{first_name} {last_name}").trim().to_string()),
            first_name: Some(first_name),
            last_name: Some(last_name),
            email: Some(self.email.trim().to_string()),
            phone: Some(self.phone.trim().to_string()),
            company: Some(self.company.trim().to_string()),
            designation: Some(self.designation.trim().to_string()),
            location: Some(self.location.trim().to_string()),
            social_links: None,
            profile_complete: Some(profile_complete),
        }
    }
}

/// Password length is not checked at login; that rule belongs to signup.
pub fn validate_login(input: &Credentials) -> ValidationReport {
    let mut report = ValidationReport::default();
    report.check_email(&input.email);
    if input.password.is_empty() {
        report.reject(Field::Password, PASSWORD_REQUIRED);
    }
    report
}

pub fn validate_signup(input: &SignupInput) -> ValidationReport {
    let mut report = ValidationReport::default();
    report.require(
        Field::FirstName,
        &input.first_name,
        &Field::FirstName.required_message(),
    );
    report.require(
        Field::LastName,
        &input.last_name,
        &Field::LastName.required_message(),
    );
    report.check_email(&input.email);

    if input.password.is_empty() {
        report.reject(Field::Password, PASSWORD_REQUIRED);
    } else if input.password.chars().count() < MIN_PASSWORD_LEN {
        report.reject(Field::Password, PASSWORD_TOO_SHORT);
    }

    if input.confirm_password.is_empty() {
        report.reject(Field::ConfirmPassword, CONFIRM_REQUIRED);
    } else if input.confirm_password != input.password {
        report.reject(Field::ConfirmPassword, PASSWORDS_DIFFER);
    }

    if !input.agree_to_terms {
        report.notice = Some(TERMS_REQUIRED.to_string());
    }
    report
}

pub fn validate_reset(input: &PasswordResetInput) -> ValidationReport {
    let mut report = ValidationReport::default();
    report.check_email(&input.email);
    report
}

/// Phone is optional; everything else is required.
pub fn validate_contact(input: &ContactInput) -> ValidationReport {
    let mut report = ValidationReport::default();
    for (field, value) in [
        (Field::Name, &input.name),
        (Field::Service, &input.service),
        (Field::Message, &input.message),
    ] {
        report.require(field, value, &field.required_message());
    }
    report.check_email(&input.email);
    if !input.phone.trim().is_empty() && !is_valid_phone(&input.phone) {
        report.reject(Field::Phone, PHONE_INVALID);
    }
    if !report.is_valid() {
        report.notice = Some(CONTACT_INCOMPLETE.to_string());
    }
    report
}

pub fn validate_profile(input: &ProfileInput) -> ValidationReport {
    let mut report = ValidationReport::default();
    report.require(
        Field::FirstName,
        &input.first_name,
        &Field::FirstName.required_message(),
    );
    report.require(
        Field::LastName,
        &input.last_name,
        &Field::LastName.required_message(),
    );
    report.check_email(&input.email);
    if !input.phone.trim().is_empty() && !is_valid_phone(&input.phone) {
        report.reject(Field::Phone, PHONE_INVALID);
    }
    report
}

/// Per-input state shown next to a field while the user types.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FieldValidationState {
    #[default]
    Untouched,
    Valid,
    Invalid(String),
}

impl FieldValidationState {
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Invalid(message) => Some(message),
            _ => None,
        }
    }
}

/// Live (blur) validation of a single field. Never looks at sibling fields,
/// so password confirmation is only compared on submit.
pub fn validate_field(field: Field, value: &str, required: bool) -> FieldValidationState {
    if value.trim().is_empty() {
        return if required {
            FieldValidationState::Invalid(field.required_message())
        } else {
            FieldValidationState::Untouched
        };
    }

    let error = match field {
        Field::Email if !is_valid_email(value.trim()) => Some(EMAIL_INVALID),
        Field::Password | Field::ConfirmPassword
            if value.chars().count() < MIN_PASSWORD_LEN =>
        {
            Some(PASSWORD_TOO_SHORT)
        }
        Field::Phone if !is_valid_phone(value) => Some(PHONE_INVALID),
        _ => None,
    };

    match error {
        Some(message) => FieldValidationState::Invalid(message.to_string()),
        None => FieldValidationState::Valid,
    }
}
