//! # The identity provider capability
//!
//! [`IdentityProvider`] is everything the site needs from a managed
//! authentication service. Password hashing, token issuance and email
//! delivery all live on the other side of this trait.
//!
//! The trait is `?Send`: the site runs on a single UI event loop, and browser
//! HTTP futures cannot cross threads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// The signed-in user as reported by the identity provider.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub email_verified: bool,
}

impl AuthUser {
    /// Display name, falling back to email.
    pub fn label(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.email.as_deref())
    }
}

/// Result of a popup-based federated sign-in.
#[derive(Clone, Debug, PartialEq)]
pub struct FederatedSignIn {
    pub user: AuthUser,
    pub is_new_user: bool,
}

/// How long the provider keeps a session alive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persistence {
    /// Survives a browser restart.
    Durable,
    /// Ends with the browser session.
    #[default]
    Session,
}

impl Persistence {
    pub fn remembering(remember: bool) -> Self {
        if remember {
            Self::Durable
        } else {
            Self::Session
        }
    }
}

#[async_trait(?Send)]
pub trait IdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ProviderError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, ProviderError>;
    async fn sign_out(&self) -> Result<(), ProviderError>;
    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError>;
    async fn federated_sign_in(&self) -> Result<FederatedSignIn, ProviderError>;
    async fn set_session_persistence(&self, mode: Persistence) -> Result<(), ProviderError>;
    /// Update the signed-in user's display name.
    async fn update_display_name(&self, name: &str) -> Result<(), ProviderError>;
    /// Email a verification link to the signed-in user.
    async fn send_email_verification(&self) -> Result<(), ProviderError>;
    /// Resume a session kept from an earlier page load, if the persistence
    /// mode it was stored under still holds it.
    async fn restore_session(&self) -> Result<Option<AuthUser>, ProviderError> {
        Ok(self.current_user())
    }
    fn current_user(&self) -> Option<AuthUser>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_prefers_display_name() {
        let mut user = AuthUser {
            uid: "u1".into(),
            email: Some("a@b.com".into()),
            ..Default::default()
        };
        assert_eq!(user.label(), Some("a@b.com"));

        user.display_name = Some(String::new());
        assert_eq!(user.label(), Some("a@b.com"));

        user.display_name = Some("Asha".into());
        assert_eq!(user.label(), Some("Asha"));
    }

    #[test]
    fn test_persistence_from_remember_flag() {
        assert_eq!(Persistence::remembering(true), Persistence::Durable);
        assert_eq!(Persistence::remembering(false), Persistence::Session);
    }
}
