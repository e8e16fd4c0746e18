//! Errors reported by the identity provider.

use std::fmt;

/// The stable identifier an identity provider attaches to a failure.
///
/// Identifiers are accepted with or without the `auth/` namespace prefix.
/// Anything unrecognised is kept verbatim in [`ProviderErrorKind::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    UserNotFound,
    WrongPassword,
    InvalidCredential,
    InvalidEmail,
    UserDisabled,
    TooManyRequests,
    EmailAlreadyInUse,
    WeakPassword,
    OperationNotAllowed,
    PopupClosedByUser,
    PopupBlocked,
    CancelledPopupRequest,
    NetworkRequestFailed,
    Other(String),
}

impl ProviderErrorKind {
    pub fn from_code(code: &str) -> Self {
        let code = code.strip_prefix("auth/").unwrap_or(code);
        match code {
            "user-not-found" => Self::UserNotFound,
            "wrong-password" => Self::WrongPassword,
            "invalid-credential" | "invalid-login-credentials" => Self::InvalidCredential,
            "invalid-email" => Self::InvalidEmail,
            "user-disabled" => Self::UserDisabled,
            "too-many-requests" => Self::TooManyRequests,
            "email-already-in-use" => Self::EmailAlreadyInUse,
            "weak-password" => Self::WeakPassword,
            "operation-not-allowed" => Self::OperationNotAllowed,
            "popup-closed-by-user" => Self::PopupClosedByUser,
            "popup-blocked" => Self::PopupBlocked,
            "cancelled-popup-request" => Self::CancelledPopupRequest,
            "network-request-failed" => Self::NetworkRequestFailed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::UserNotFound => "user-not-found",
            Self::WrongPassword => "wrong-password",
            Self::InvalidCredential => "invalid-credential",
            Self::InvalidEmail => "invalid-email",
            Self::UserDisabled => "user-disabled",
            Self::TooManyRequests => "too-many-requests",
            Self::EmailAlreadyInUse => "email-already-in-use",
            Self::WeakPassword => "weak-password",
            Self::OperationNotAllowed => "operation-not-allowed",
            Self::PopupClosedByUser => "popup-closed-by-user",
            Self::PopupBlocked => "popup-blocked",
            Self::CancelledPopupRequest => "cancelled-popup-request",
            Self::NetworkRequestFailed => "network-request-failed",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "auth/{}", self.code())
    }
}

/// A rejected identity provider call.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn from_code(code: &str, message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::from_code(code), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_parse_with_and_without_prefix() {
        assert_eq!(
            ProviderErrorKind::from_code("auth/wrong-password"),
            ProviderErrorKind::WrongPassword
        );
        assert_eq!(
            ProviderErrorKind::from_code("popup-blocked"),
            ProviderErrorKind::PopupBlocked
        );
        assert_eq!(
            ProviderErrorKind::from_code("auth/quota-exceeded"),
            ProviderErrorKind::Other("quota-exceeded".to_string())
        );
    }

    #[test]
    fn test_code_round_trips_for_known_kinds() {
        let kinds = [
            ProviderErrorKind::UserNotFound,
            ProviderErrorKind::EmailAlreadyInUse,
            ProviderErrorKind::CancelledPopupRequest,
            ProviderErrorKind::NetworkRequestFailed,
        ];
        for kind in kinds {
            assert_eq!(ProviderErrorKind::from_code(kind.code()), kind);
        }
    }

    #[test]
    fn test_display() {
        let err = ProviderError::from_code("auth/user-disabled", "disabled by admin");
        assert_eq!(err.to_string(), "auth/user-disabled: disabled by admin");
    }
}
