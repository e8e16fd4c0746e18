//! Browser implementations of the controller's [`Clock`] and [`Navigator`],
//! plus the Google sign-in redirect.

use std::rc::Rc;
use std::time::Duration;

use api::firebase::FirebaseAuth;
#[cfg(target_arch = "wasm32")]
use api::firebase::google;
use api::{ProviderError, ProviderErrorKind};
use async_trait::async_trait;
use auth::{AuthForm, Clock, Navigator};
use chrono::{DateTime, Utc};
use dioxus::prelude::*;

/// Wall clock plus a sleep that does not block the event loop.
pub struct BrowserClock;

#[async_trait(?Send)]
impl Clock for BrowserClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        #[cfg(target_arch = "wasm32")]
        gloo_timers::future::sleep(duration).await;
        #[cfg(not(target_arch = "wasm32"))]
        tokio::time::sleep(duration).await;
    }
}

/// Full page loads for redirects; form switches flip the active-form signal.
pub struct PageNavigator {
    pub active_form: Signal<AuthForm>,
}

impl Navigator for PageNavigator {
    fn redirect(&self, path: &str) {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(window) = web_sys::window() {
                if let Err(e) = window.location().set_href(path) {
                    tracing::error!("Failed to navigate to {}: {:?}", path, e);
                }
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        tracing::info!("Redirect to {} requested outside a browser", path);
    }

    fn switch_form(&self, form: AuthForm) {
        let mut active_form = self.active_form;
        active_form.set(form);
    }
}

/// Google sign-in by a full-page trip to Google's consent page and back to
/// the auth page.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub struct GoogleRedirect {
    firebase: Rc<FirebaseAuth>,
    client_id: String,
    auth_path: String,
}

impl GoogleRedirect {
    pub fn new(firebase: Rc<FirebaseAuth>, client_id: String, auth_path: String) -> Self {
        Self {
            firebase,
            client_id,
            auth_path,
        }
    }

    /// Leave for Google. Errors before the page is left are the caller's to report.
    pub fn start(&self) -> Result<(), ProviderError> {
        #[cfg(target_arch = "wasm32")]
        {
            let window = web_sys::window().ok_or_else(no_window)?;
            let origin = window.location().origin().map_err(|_| no_window())?;
            let redirect_uri = format!("{}{}", origin, self.auth_path);
            let state = google::new_nonce();
            let url = google::authorization_url(
                &self.client_id,
                &redirect_uri,
                &state,
                &google::new_nonce(),
            )?;
            if let Ok(Some(storage)) = window.session_storage() {
                let _ = storage.set_item(google::STATE_KEY, &state);
            }
            tracing::debug!("Leaving for Google sign-in");
            window.location().set_href(&url).map_err(|_| no_window())
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            Err(no_window())
        }
    }

    /// Hand the ID token Google left in the URL fragment to the provider.
    /// `Ok(true)` when there was one and a federated sign-in can run.
    pub fn take_credential(&self) -> Result<bool, ProviderError> {
        #[cfg(target_arch = "wasm32")]
        {
            let Some(window) = web_sys::window() else {
                return Ok(false);
            };
            let location = window.location();
            let fragment = location.hash().unwrap_or_default();
            let storage = window.session_storage().ok().flatten();
            let expected = storage
                .as_ref()
                .and_then(|storage| storage.get_item(google::STATE_KEY).ok().flatten());

            let credential = google::credential_from_fragment(&fragment, expected.as_deref());
            if !matches!(credential, Ok(None)) {
                if let Some(storage) = &storage {
                    let _ = storage.remove_item(google::STATE_KEY);
                }
                let _ = location.set_hash("");
            }
            match credential? {
                Some(token) => {
                    self.firebase.set_federated_credential(token);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            Ok(false)
        }
    }
}

fn no_window() -> ProviderError {
    ProviderError::new(
        ProviderErrorKind::PopupBlocked,
        "Google sign-in needs a browser window",
    )
}
