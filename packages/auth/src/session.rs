use api::AuthUser;

/// What the navigation bar shows about the current session.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthState {
    pub user: Option<AuthUser>,
    /// True until the first check against the provider has completed.
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

impl AuthState {
    pub fn resolved(user: Option<AuthUser>) -> Self {
        Self {
            user,
            loading: false,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Display name, then email, then "Login".
    pub fn nav_label(&self) -> String {
        self.user
            .as_ref()
            .and_then(AuthUser::label)
            .unwrap_or("Login")
            .to_string()
    }
}
