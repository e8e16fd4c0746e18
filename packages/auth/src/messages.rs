//! User-facing text for every workflow outcome.
//!
//! Each workflow maps [`ProviderErrorKind`] with an exhaustive `match`. A new
//! kind has to be placed in every table before the crate compiles again; the
//! kinds a workflow has no special wording for are listed in its fallback arm.

use api::ProviderErrorKind;

pub const LOGIN_SUCCESS: &str = "Login successful! Welcome back.";
pub const SIGNUP_SUCCESS: &str =
    "Account created successfully! Please check your email for verification.";
pub const RESET_SUCCESS: &str = "Password reset email sent! Check your inbox.";
pub const SOCIAL_RETURNING: &str = "Welcome back! Login successful.";
pub const SIGN_OUT_SUCCESS: &str = "Successfully signed out!";
pub const SIGN_OUT_FAILED: &str = "Error signing out. Please try again.";
pub const PROFILE_NOT_SAVED: &str =
    "Your account was created, but your profile could not be saved. Please contact support.";
pub const CONTACT_SUCCESS: &str = "Thank you for your message! We'll get back to you soon.";
pub const CONTACT_FAILED: &str = "Something went wrong. Please try again.";
pub const PROFILE_UPDATED: &str = "Profile updated successfully.";
pub const PROFILE_UPDATE_FAILED: &str = "Could not update your profile. Please try again.";
pub const PREFERENCES_UPDATED: &str = "Preferences saved.";
pub const PREFERENCES_UPDATE_FAILED: &str = "Could not save your preferences. Please try again.";

const USER_NOT_FOUND: &str = "No account found with this email address.";
const INVALID_EMAIL: &str = "Please enter a valid email address.";

pub fn social_new_user(site_name: &str) -> String {
    format!("Account created successfully! Welcome to {site_name}.")
}

pub fn login_error(kind: &ProviderErrorKind) -> &'static str {
    use ProviderErrorKind::*;
    match kind {
        UserNotFound => USER_NOT_FOUND,
        WrongPassword => "Incorrect password. Please try again.",
        InvalidCredential => "Invalid email or password. Please try again.",
        InvalidEmail => INVALID_EMAIL,
        UserDisabled => "This account has been disabled.",
        TooManyRequests => "Too many failed attempts. Please try again later.",
        EmailAlreadyInUse
        | WeakPassword
        | OperationNotAllowed
        | PopupClosedByUser
        | PopupBlocked
        | CancelledPopupRequest
        | NetworkRequestFailed
        | Other(_) => "Login failed. Please try again.",
    }
}

pub fn signup_error(kind: &ProviderErrorKind) -> &'static str {
    use ProviderErrorKind::*;
    match kind {
        EmailAlreadyInUse => "An account with this email already exists.",
        InvalidEmail => INVALID_EMAIL,
        WeakPassword => "Password should be at least 6 characters long.",
        OperationNotAllowed => "Email/password accounts are not enabled.",
        UserNotFound
        | WrongPassword
        | InvalidCredential
        | UserDisabled
        | TooManyRequests
        | PopupClosedByUser
        | PopupBlocked
        | CancelledPopupRequest
        | NetworkRequestFailed
        | Other(_) => "Account creation failed. Please try again.",
    }
}

pub fn reset_error(kind: &ProviderErrorKind) -> &'static str {
    use ProviderErrorKind::*;
    match kind {
        UserNotFound => USER_NOT_FOUND,
        InvalidEmail => INVALID_EMAIL,
        WrongPassword
        | InvalidCredential
        | UserDisabled
        | TooManyRequests
        | EmailAlreadyInUse
        | WeakPassword
        | OperationNotAllowed
        | PopupClosedByUser
        | PopupBlocked
        | CancelledPopupRequest
        | NetworkRequestFailed
        | Other(_) => "Failed to send reset email. Please try again.",
    }
}

pub fn social_error(kind: &ProviderErrorKind) -> &'static str {
    use ProviderErrorKind::*;
    match kind {
        PopupClosedByUser | CancelledPopupRequest => "Sign-in cancelled. Please try again.",
        PopupBlocked => "Popup blocked. Please allow popups and try again.",
        UserNotFound
        | WrongPassword
        | InvalidCredential
        | InvalidEmail
        | UserDisabled
        | TooManyRequests
        | EmailAlreadyInUse
        | WeakPassword
        | OperationNotAllowed
        | NetworkRequestFailed
        | Other(_) => "Google sign-in failed. Please try again.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_table() {
        assert_eq!(
            login_error(&ProviderErrorKind::from_code("auth/wrong-password")),
            "Incorrect password. Please try again."
        );
        assert_eq!(
            login_error(&ProviderErrorKind::from_code("user-not-found")),
            "No account found with this email address."
        );
        assert_eq!(
            login_error(&ProviderErrorKind::from_code("auth/something-new")),
            "Login failed. Please try again."
        );
    }

    #[test]
    fn test_signup_table() {
        assert_eq!(
            signup_error(&ProviderErrorKind::EmailAlreadyInUse),
            "An account with this email already exists."
        );
        assert_eq!(
            signup_error(&ProviderErrorKind::WrongPassword),
            "Account creation failed. Please try again."
        );
    }

    #[test]
    fn test_reset_table_shares_login_wording() {
        assert_eq!(
            reset_error(&ProviderErrorKind::UserNotFound),
            login_error(&ProviderErrorKind::UserNotFound)
        );
        assert_eq!(
            reset_error(&ProviderErrorKind::NetworkRequestFailed),
            "Failed to send reset email. Please try again."
        );
    }

    #[test]
    fn test_social_table() {
        assert_eq!(
            social_error(&ProviderErrorKind::CancelledPopupRequest),
            social_error(&ProviderErrorKind::PopupClosedByUser)
        );
        assert_eq!(
            social_error(&ProviderErrorKind::PopupBlocked),
            "Popup blocked. Please allow popups and try again."
        );
        assert_eq!(
            social_new_user("BandhanNova"),
            "Account created successfully! Welcome to BandhanNova."
        );
    }
}
