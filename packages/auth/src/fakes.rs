//! Test doubles for the injected services.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use api::{
    AuthUser, FederatedSignIn, IdentityProvider, Persistence, ProviderError, ProviderErrorKind,
};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::env::{Clock, Navigator};
use crate::timer::AuthForm;

/// Identity provider that records every call and fails on request.
pub struct FakeIdentity {
    pub calls: RefCell<Vec<&'static str>>,
    pub persistence: Cell<Option<Persistence>>,
    pub display_name: RefCell<Option<String>>,
    failures: RefCell<HashMap<&'static str, ProviderErrorKind>>,
    user: RefCell<AuthUser>,
    signed_in: Cell<bool>,
    remembered: Cell<bool>,
    new_user: Cell<bool>,
}

impl Default for FakeIdentity {
    fn default() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            persistence: Cell::new(None),
            display_name: RefCell::new(None),
            failures: RefCell::new(HashMap::new()),
            user: RefCell::new(AuthUser {
                uid: "u1".into(),
                email: Some("a@b.com".into()),
                display_name: None,
                photo_url: None,
                email_verified: false,
            }),
            signed_in: Cell::new(false),
            remembered: Cell::new(false),
            new_user: Cell::new(false),
        }
    }
}

impl FakeIdentity {
    pub fn fail(&self, call: &'static str, kind: ProviderErrorKind) {
        self.failures.borrow_mut().insert(call, kind);
    }

    pub fn set_user(&self, user: AuthUser) {
        *self.user.borrow_mut() = user;
    }

    pub fn sign_in_as_new_user(&self, new_user: bool) {
        self.new_user.set(new_user);
    }

    pub fn set_signed_in(&self, signed_in: bool) {
        self.signed_in.set(signed_in);
    }

    /// Leave a session behind for `restore_session` to pick up.
    pub fn remember_session(&self, remembered: bool) {
        self.remembered.set(remembered);
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Record the call, suspend once like a network request, then fail if asked to.
    async fn call(&self, name: &'static str) -> Result<(), ProviderError> {
        self.calls.borrow_mut().push(name);
        tokio::task::yield_now().await;
        match self.failures.borrow().get(name) {
            Some(kind) => Err(ProviderError::new(kind.clone(), format!("{name} failed"))),
            None => Ok(()),
        }
    }

    fn session_user(&self) -> AuthUser {
        self.signed_in.set(true);
        self.user.borrow().clone()
    }
}

#[async_trait(?Send)]
impl IdentityProvider for FakeIdentity {
    async fn sign_in(&self, _email: &str, _password: &str) -> Result<AuthUser, ProviderError> {
        self.call("sign_in").await?;
        Ok(self.session_user())
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> Result<AuthUser, ProviderError> {
        self.call("sign_up").await?;
        Ok(self.session_user())
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.call("sign_out").await?;
        self.signed_in.set(false);
        Ok(())
    }

    async fn send_password_reset(&self, _email: &str) -> Result<(), ProviderError> {
        self.call("send_password_reset").await
    }

    async fn federated_sign_in(&self) -> Result<FederatedSignIn, ProviderError> {
        self.call("federated_sign_in").await?;
        Ok(FederatedSignIn {
            user: self.session_user(),
            is_new_user: self.new_user.get(),
        })
    }

    async fn set_session_persistence(&self, mode: Persistence) -> Result<(), ProviderError> {
        self.call("set_session_persistence").await?;
        self.persistence.set(Some(mode));
        Ok(())
    }

    async fn update_display_name(&self, name: &str) -> Result<(), ProviderError> {
        self.call("update_display_name").await?;
        *self.display_name.borrow_mut() = Some(name.to_string());
        Ok(())
    }

    async fn send_email_verification(&self) -> Result<(), ProviderError> {
        self.call("send_email_verification").await
    }

    async fn restore_session(&self) -> Result<Option<AuthUser>, ProviderError> {
        self.call("restore_session").await?;
        if self.remembered.get() {
            self.signed_in.set(true);
        }
        Ok(self.current_user())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.signed_in.get().then(|| self.user.borrow().clone())
    }
}

/// Clock frozen at a fixed instant. Sleeping only records the duration.
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
    pub slept: RefCell<Vec<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Cell::new(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            slept: RefCell::new(Vec::new()),
        }
    }
}

#[async_trait(?Send)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    async fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
        self.now.set(self.now.get() + chrono::Duration::from_std(duration).unwrap());
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Navigation {
    Redirect(String),
    SwitchForm(AuthForm),
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub navigations: RefCell<Vec<Navigation>>,
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        self.navigations
            .borrow_mut()
            .push(Navigation::Redirect(path.to_string()));
    }

    fn switch_form(&self, form: AuthForm) {
        self.navigations
            .borrow_mut()
            .push(Navigation::SwitchForm(form));
    }
}
