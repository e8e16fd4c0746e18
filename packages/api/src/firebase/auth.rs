//! # Firebase Authentication over the Identity Toolkit REST API
//!
//! [`FirebaseAuth`] implements [`IdentityProvider`] with plain HTTPS calls:
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | `sign_in` | `accounts:signInWithPassword` |
//! | `sign_up` | `accounts:signUp` |
//! | `send_password_reset` | `accounts:sendOobCode` (`PASSWORD_RESET`) |
//! | `send_email_verification` | `accounts:sendOobCode` (`VERIFY_EMAIL`) |
//! | `update_display_name` | `accounts:update` |
//! | `federated_sign_in` | `accounts:signInWithIdp` |
//!
//! The REST API reports failures as upper-case strings (`EMAIL_NOT_FOUND`,
//! `WEAK_PASSWORD : Password should be at least 6 characters`, ...), which
//! [`kind_from_rest`] maps onto [`ProviderErrorKind`].
//!
//! ## Federated sign-in
//!
//! Google's consent page runs outside the app (see [`google`](super::google)).
//! The host hands the resulting Google ID token to
//! [`set_federated_credential`](FirebaseAuth::set_federated_credential) and the
//! next `federated_sign_in` exchanges it. Without a credential the call fails
//! as `popup-closed-by-user`.
//!
//! ## Sessions
//!
//! The user and ID token live in memory. The refresh token also goes to the
//! [`TokenStore`] slot of the current persistence mode, and
//! `restore_session` trades it back for a session after a page load
//! (`securetoken` `token` exchange, then `accounts:lookup`).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ProviderError, ProviderErrorKind};
use crate::identity::{AuthUser, FederatedSignIn, IdentityProvider, Persistence};
use crate::settings::Firebase;

use super::tokens::{default_token_store, TokenStore};

#[derive(Clone, Debug)]
struct Session {
    user: AuthUser,
    id_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    #[serde(default)]
    email_verified: bool,
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    is_new_user: bool,
}

impl AccountResponse {
    fn into_session(self) -> (Session, bool) {
        let session = Session {
            user: AuthUser {
                uid: self.local_id,
                email: self.email,
                display_name: self.display_name.filter(|name| !name.is_empty()),
                photo_url: self.photo_url.filter(|url| !url.is_empty()),
                email_verified: self.email_verified,
            },
            id_token: self.id_token,
            refresh_token: self.refresh_token,
        };
        (session, self.is_new_user)
    }
}

/// Secure Token service reply to a refresh token exchange.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupAccount {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupAccount>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map an Identity Toolkit error string to a provider error kind.
pub fn kind_from_rest(message: &str) -> ProviderErrorKind {
    let code = message.split(':').next().unwrap_or_default().trim();
    match code {
        "EMAIL_NOT_FOUND" => ProviderErrorKind::UserNotFound,
        "INVALID_PASSWORD" => ProviderErrorKind::WrongPassword,
        "INVALID_LOGIN_CREDENTIALS" => ProviderErrorKind::InvalidCredential,
        "USER_DISABLED" => ProviderErrorKind::UserDisabled,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => ProviderErrorKind::TooManyRequests,
        "EMAIL_EXISTS" => ProviderErrorKind::EmailAlreadyInUse,
        "WEAK_PASSWORD" => ProviderErrorKind::WeakPassword,
        "INVALID_EMAIL" | "MISSING_EMAIL" => ProviderErrorKind::InvalidEmail,
        "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => {
            ProviderErrorKind::OperationNotAllowed
        }
        other => ProviderErrorKind::Other(other.to_ascii_lowercase().replace('_', "-")),
    }
}

fn network_error(e: reqwest::Error) -> ProviderError {
    ProviderError::new(ProviderErrorKind::NetworkRequestFailed, e.to_string())
}

/// Firebase Authentication client.
pub struct FirebaseAuth {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    token_endpoint: String,
    request_uri: String,
    session: RefCell<Option<Session>>,
    persistence: Cell<Persistence>,
    tokens: Rc<dyn TokenStore>,
    federated_credential: RefCell<Option<String>>,
}

impl FirebaseAuth {
    pub fn new(config: &Firebase) -> Self {
        Self::with_token_store(config, default_token_store())
    }

    pub fn with_token_store(config: &Firebase, tokens: Rc<dyn TokenStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            endpoint: config.auth_endpoint.trim_end_matches('/').to_string(),
            token_endpoint: config.token_endpoint.trim_end_matches('/').to_string(),
            request_uri: format!("https://{}", config.auth_domain),
            session: RefCell::new(None),
            persistence: Cell::new(Persistence::default()),
            tokens,
            federated_credential: RefCell::new(None),
        }
    }

    /// ID token of the signed-in user, for authorizing data store requests.
    pub fn id_token(&self) -> Option<String> {
        self.session
            .borrow()
            .as_ref()
            .map(|session| session.id_token.clone())
    }

    pub fn persistence(&self) -> Persistence {
        self.persistence.get()
    }

    /// Provide the Google ID token obtained by the host's sign-in popup.
    pub fn set_federated_credential(&self, google_id_token: String) {
        *self.federated_credential.borrow_mut() = Some(google_id_token);
    }

    fn require_id_token(&self) -> Result<String, ProviderError> {
        self.id_token().ok_or_else(|| {
            ProviderError::new(
                ProviderErrorKind::Other("no-current-user".to_string()),
                "No user is signed in",
            )
        })
    }

    /// A stored refresh token and the mode it was stored under. The tab's
    /// own session slot wins over the durable one.
    pub fn stored_refresh_token(&self) -> Option<(Persistence, String)> {
        [Persistence::Session, Persistence::Durable]
            .into_iter()
            .find_map(|mode| self.tokens.load(mode).map(|token| (mode, token)))
    }

    /// Keep `refresh_token` in the slot of the current mode only.
    fn store_refresh_token(&self, refresh_token: &str) {
        let mode = self.persistence.get();
        for slot in [Persistence::Session, Persistence::Durable] {
            if slot != mode {
                self.tokens.clear(slot);
            }
        }
        self.tokens.save(mode, refresh_token);
    }

    fn forget_refresh_token(&self) {
        self.tokens.clear(Persistence::Session);
        self.tokens.clear(Persistence::Durable);
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: Value,
    ) -> Result<T, ProviderError> {
        let url = format!("{}/accounts:{}?key={}", self.endpoint, method, self.api_key);
        self.send(self.http.post(&url).json(&body)).await
    }

    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, ProviderError> {
        let url = format!("{}/token?key={}", self.token_endpoint, self.api_key);
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        self.send(self.http.post(&url).form(&form)).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ProviderError> {
        let response = request.send().await.map_err(network_error)?;

        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(network_error);
        }

        match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => {
                let message = envelope.error.message;
                Err(ProviderError::new(kind_from_rest(&message), message))
            }
            Err(_) => Err(ProviderError::new(
                ProviderErrorKind::Other(format!("http-{}", status.as_u16())),
                status.to_string(),
            )),
        }
    }

    fn start_session(&self, response: AccountResponse) -> (AuthUser, bool) {
        let (session, is_new_user) = response.into_session();
        let user = session.user.clone();
        self.keep(session);
        (user, is_new_user)
    }

    fn keep(&self, session: Session) {
        self.store_refresh_token(&session.refresh_token);
        *self.session.borrow_mut() = Some(session);
    }
}

#[async_trait(?Send)]
impl IdentityProvider for FirebaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ProviderError> {
        let response: AccountResponse = self
            .call(
                "signInWithPassword",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        Ok(self.start_session(response).0)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, ProviderError> {
        let response: AccountResponse = self
            .call(
                "signUp",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        Ok(self.start_session(response).0)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.session.borrow_mut().take();
        self.forget_refresh_token();
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        let _: Value = self
            .call(
                "sendOobCode",
                json!({ "requestType": "PASSWORD_RESET", "email": email }),
            )
            .await?;
        Ok(())
    }

    async fn federated_sign_in(&self) -> Result<FederatedSignIn, ProviderError> {
        let credential = self.federated_credential.borrow_mut().take().ok_or_else(|| {
            ProviderError::new(
                ProviderErrorKind::PopupClosedByUser,
                "No Google credential was provided",
            )
        })?;
        let response: AccountResponse = self
            .call(
                "signInWithIdp",
                json!({
                    "postBody": format!("id_token={credential}&providerId=google.com"),
                    "requestUri": self.request_uri,
                    "returnIdpCredential": true,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        let (user, is_new_user) = self.start_session(response);
        Ok(FederatedSignIn { user, is_new_user })
    }

    async fn set_session_persistence(&self, mode: Persistence) -> Result<(), ProviderError> {
        self.persistence.set(mode);
        let refresh_token = self
            .session
            .borrow()
            .as_ref()
            .map(|session| session.refresh_token.clone());
        if let Some(refresh_token) = refresh_token {
            self.store_refresh_token(&refresh_token);
        }
        Ok(())
    }

    async fn update_display_name(&self, name: &str) -> Result<(), ProviderError> {
        let id_token = self.require_id_token()?;
        let _: Value = self
            .call(
                "update",
                json!({ "idToken": id_token, "displayName": name, "returnSecureToken": false }),
            )
            .await?;
        if let Some(session) = self.session.borrow_mut().as_mut() {
            session.user.display_name = Some(name.to_string());
        }
        Ok(())
    }

    async fn send_email_verification(&self) -> Result<(), ProviderError> {
        let id_token = self.require_id_token()?;
        let _: Value = self
            .call(
                "sendOobCode",
                json!({ "requestType": "VERIFY_EMAIL", "idToken": id_token }),
            )
            .await?;
        Ok(())
    }

    async fn restore_session(&self) -> Result<Option<AuthUser>, ProviderError> {
        if let Some(user) = self.current_user() {
            return Ok(Some(user));
        }
        let Some((mode, refresh_token)) = self.stored_refresh_token() else {
            return Ok(None);
        };
        self.persistence.set(mode);

        let tokens = match self.exchange_refresh_token(&refresh_token).await {
            Ok(tokens) => tokens,
            Err(e) => {
                // Only a network failure leaves the token worth keeping.
                if e.kind != ProviderErrorKind::NetworkRequestFailed {
                    self.forget_refresh_token();
                }
                return Err(e);
            }
        };
        let lookup: LookupResponse = self
            .call("lookup", json!({ "idToken": tokens.id_token }))
            .await?;
        let Some(account) = lookup.users.into_iter().next() else {
            self.forget_refresh_token();
            return Ok(None);
        };

        let user = AuthUser {
            uid: account.local_id,
            email: account.email,
            display_name: account.display_name.filter(|name| !name.is_empty()),
            photo_url: account.photo_url.filter(|url| !url.is_empty()),
            email_verified: account.email_verified,
        };
        tracing::debug!("Restored {:?} session of {}", mode, user.uid);
        self.keep(Session {
            user: user.clone(),
            id_token: tokens.id_token,
            refresh_token: tokens.refresh_token,
        });
        Ok(Some(user))
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.session
            .borrow()
            .as_ref()
            .map(|session| session.user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firebase::MemoryTokenStore;

    #[test]
    fn test_rest_errors_map_to_kinds() {
        assert_eq!(kind_from_rest("EMAIL_NOT_FOUND"), ProviderErrorKind::UserNotFound);
        assert_eq!(kind_from_rest("INVALID_PASSWORD"), ProviderErrorKind::WrongPassword);
        assert_eq!(
            kind_from_rest("WEAK_PASSWORD : Password should be at least 6 characters"),
            ProviderErrorKind::WeakPassword
        );
        assert_eq!(
            kind_from_rest("TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled"),
            ProviderErrorKind::TooManyRequests
        );
        assert_eq!(
            kind_from_rest("CREDENTIAL_TOO_OLD_LOGIN_AGAIN"),
            ProviderErrorKind::Other("credential-too-old-login-again".to_string())
        );
    }

    #[test]
    fn test_account_response_drops_empty_profile_fields() {
        let response: AccountResponse = serde_json::from_value(json!({
            "localId": "abc",
            "email": "a@b.com",
            "displayName": "",
            "idToken": "id",
            "refreshToken": "refresh",
            "registered": true
        }))
        .unwrap();

        let (session, is_new_user) = response.into_session();
        assert_eq!(session.user.uid, "abc");
        assert_eq!(session.user.display_name, None);
        assert!(!session.user.email_verified);
        assert!(!is_new_user);
    }

    #[tokio::test]
    async fn test_federated_sign_in_without_credential() {
        let auth = FirebaseAuth::new(&Firebase::default());
        let err = auth.federated_sign_in().await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::PopupClosedByUser);
        assert!(auth.current_user().is_none());
    }

    fn signed_in(tokens: &Rc<MemoryTokenStore>) -> FirebaseAuth {
        let auth = FirebaseAuth::with_token_store(&Firebase::default(), tokens.clone());
        let response: AccountResponse = serde_json::from_value(json!({
            "localId": "u1",
            "email": "a@b.com",
            "idToken": "id-1",
            "refreshToken": "refresh-1"
        }))
        .unwrap();
        auth.start_session(response);
        auth
    }

    /// A page load: same browser storage, fresh client.
    fn reload(tokens: &Rc<MemoryTokenStore>) -> FirebaseAuth {
        FirebaseAuth::with_token_store(&Firebase::default(), tokens.clone())
    }

    #[tokio::test]
    async fn test_durable_session_survives_browser_restart() {
        let tokens = Rc::new(MemoryTokenStore::default());
        let auth = signed_in(&tokens);
        auth.set_session_persistence(Persistence::Durable).await.unwrap();
        assert_eq!(auth.persistence(), Persistence::Durable);
        assert_eq!(tokens.load(Persistence::Session), None);

        tokens.end_browser_session();
        assert_eq!(
            reload(&tokens).stored_refresh_token(),
            Some((Persistence::Durable, "refresh-1".to_string()))
        );
    }

    #[tokio::test]
    async fn test_session_scoped_login_ends_with_the_browser() {
        let tokens = Rc::new(MemoryTokenStore::default());
        let auth = signed_in(&tokens);
        auth.set_session_persistence(Persistence::Session).await.unwrap();

        // Redirects within the tab still find the token.
        assert_eq!(
            reload(&tokens).stored_refresh_token(),
            Some((Persistence::Session, "refresh-1".to_string()))
        );

        tokens.end_browser_session();
        let restarted = reload(&tokens);
        assert_eq!(restarted.stored_refresh_token(), None);
        assert_eq!(restarted.restore_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_out_forgets_stored_session() {
        let tokens = Rc::new(MemoryTokenStore::default());
        let auth = signed_in(&tokens);
        auth.set_session_persistence(Persistence::Durable).await.unwrap();

        auth.sign_out().await.unwrap();
        assert!(auth.id_token().is_none());
        assert_eq!(reload(&tokens).stored_refresh_token(), None);
    }

    #[tokio::test]
    async fn test_restore_keeps_live_session() {
        let tokens = Rc::new(MemoryTokenStore::default());
        let auth = signed_in(&tokens);
        let user = auth.restore_session().await.unwrap().unwrap();
        assert_eq!(user.uid, "u1");
    }
}
