//! # Domain models stored in the data store
//!
//! ## Types
//!
//! | Struct | Collection | Represents |
//! |--------|-----------|-----------|
//! | [`UserRecord`] | `users` | Durable profile of a signed-up user, keyed by provider user id. |
//! | [`ContactSubmission`] | `contacts` | A message sent through the landing page contact form. |
//!
//! Field names are camelCase on the wire. Every struct is `#[serde(default)]`,
//! so documents written by older versions of the site (or edited by hand)
//! still decode, with missing fields taking their defaults. This is also how
//! stored preferences are merged over [`Preferences::default`].
//!
//! Timestamps are never written from the client: [`UserRecord::creation_patch`]
//! replaces them with server timestamps.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{Patch, StoreError};

/// How the user first authenticated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInProvider {
    #[default]
    Email,
    Google,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// User-facing preferences.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub newsletter: bool,
    pub notifications: bool,
    pub theme: String,
    pub language: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            newsletter: true,
            notifications: true,
            theme: "dark".to_string(),
            language: "en".to_string(),
        }
    }
}

const TIMESTAMP_FIELDS: [&str; 4] = ["createdAt", "lastLoginAt", "lastActiveAt", "updatedAt"];
const SOCIAL_NETWORKS: [&str; 3] = ["linkedin", "github", "twitter"];

/// A user document in the `users` collection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserRecord {
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub email: String,

    pub provider: SignInProvider,
    pub email_verified: bool,
    #[serde(rename = "photoURL")]
    pub photo_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    pub phone: String,
    pub company: String,
    pub designation: String,
    pub location: String,

    pub preferences: Preferences,
    pub status: AccountStatus,
    pub role: Role,

    pub login_count: u64,
    pub profile_complete: bool,
    pub social_links: BTreeMap<String, String>,
}

impl UserRecord {
    /// A fresh record for an account created through the sign-up form.
    pub fn for_email_signup(first_name: &str, last_name: &str, email: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            display_name: format!("{first_name} {last_name}"),
            email: email.to_string(),
            provider: SignInProvider::Email,
            profile_complete: false,
            ..Self::new_account()
        }
    }

    /// A fresh record for an account created by a federated (Google) sign-in.
    ///
    /// The display name is split on its first space into first and last name.
    pub fn for_federated_signup(display_name: Option<&str>, email: &str) -> Self {
        let display_name = display_name.unwrap_or_default();
        let (first_name, last_name) = split_display_name(display_name);
        Self {
            first_name,
            last_name,
            display_name: display_name.to_string(),
            email: email.to_string(),
            provider: SignInProvider::Google,
            profile_complete: true,
            ..Self::new_account()
        }
    }

    fn new_account() -> Self {
        Self {
            login_count: 1,
            social_links: SOCIAL_NETWORKS
                .iter()
                .map(|network| (network.to_string(), String::new()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_email_verified(mut self, verified: bool) -> Self {
        self.email_verified = verified;
        self
    }

    pub fn with_photo_url(mut self, photo_url: Option<&str>) -> Self {
        self.photo_url = photo_url.unwrap_or_default().to_string();
        self
    }

    /// The patch that creates this record, with every timestamp set by the server.
    pub fn creation_patch(&self) -> Result<Patch, StoreError> {
        let mut patch = Patch::from_serializable(self)?;
        for field in TIMESTAMP_FIELDS {
            patch = patch.server_timestamp(field);
        }
        Ok(patch)
    }

    pub fn is_profile_complete(&self) -> bool {
        profile_is_complete(
            [&self.first_name, &self.last_name, &self.email].map(String::as_str),
            [&self.phone, &self.company, &self.designation].map(String::as_str),
        )
    }

    /// Display name, falling back to the full name, the first name, the local
    /// part of the email address, and finally `"User"`.
    pub fn resolved_display_name(&self) -> String {
        if !self.display_name.is_empty() {
            return self.display_name.clone();
        }
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => return format!("{} {}", self.first_name, self.last_name),
            (false, true) => return self.first_name.clone(),
            _ => {}
        }
        if !self.email.is_empty() {
            let local = self.email.split('@').next().unwrap_or_default();
            return local.to_string();
        }
        "User".to_string()
    }

    /// The stored photo, or an initials avatar.
    pub fn avatar_url(&self) -> String {
        if !self.photo_url.is_empty() {
            return self.photo_url.clone();
        }
        let initials: String = self
            .resolved_display_name()
            .split(' ')
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect();
        let name: String = url::form_urlencoded::byte_serialize(initials.as_bytes()).collect();
        format!("https://ui-avatars.com/api/?name={name}&background=00f5ff&color=000000&size=128")
    }

    pub fn stats(&self, now: DateTime<Utc>) -> UserStats {
        let days_since = |at: Option<DateTime<Utc>>| at.map_or(0, |at| (now - at).num_days());
        UserStats {
            login_count: self.login_count,
            days_since_registration: days_since(self.created_at),
            days_since_last_login: days_since(self.last_login_at),
            profile_complete: self.profile_complete,
            email_verified: self.email_verified,
            provider: self.provider,
            status: self.status,
            role: self.role,
        }
    }
}

/// First name, last name and email are present, plus at least two of
/// phone, company and designation.
pub fn profile_is_complete(
    [first_name, last_name, email]: [&str; 3],
    [phone, company, designation]: [&str; 3],
) -> bool {
    let filled = |s: &str| !s.trim().is_empty();
    let required = [first_name, last_name, email].into_iter().all(filled);
    let extras = [phone, company, designation]
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .count();
    required && extras >= 2
}

/// Split a display name on its first space.
pub fn split_display_name(display_name: &str) -> (String, String) {
    match display_name.split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.to_string()),
        None => (display_name.to_string(), String::new()),
    }
}

/// Summary numbers shown on a profile page.
#[derive(Clone, Debug, PartialEq)]
pub struct UserStats {
    pub login_count: u64,
    pub days_since_registration: i64,
    pub days_since_last_login: i64,
    pub profile_complete: bool,
    pub email_verified: bool,
    pub provider: SignInProvider,
    pub status: AccountStatus,
    pub role: Role,
}

/// A partial edit of a user's own profile. `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_links: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_complete: Option<bool>,
}

/// A landing page contact form message.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub message: String,
    pub status: String,
}

impl ContactSubmission {
    pub fn new(name: &str, email: &str, phone: &str, service: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            service: service.to_string(),
            message: message.to_string(),
            status: "new".to_string(),
        }
    }

    pub fn creation_patch(&self) -> Result<Patch, StoreError> {
        Ok(Patch::from_serializable(self)?.server_timestamp("timestamp"))
    }
}
