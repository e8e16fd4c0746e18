//! Where the refresh token of a signed-in user is kept between page loads.
//!
//! | Persistence | Browser storage | Survives |
//! |-------------|-----------------|----------|
//! | `Durable` | `localStorage` | reloads and browser restarts |
//! | `Session` | `sessionStorage` | reloads within the same tab |

use std::cell::RefCell;
use std::rc::Rc;

use crate::identity::Persistence;

pub const REFRESH_TOKEN_KEY: &str = "site.auth.refreshToken";

/// Storage slots for a refresh token, one per persistence mode.
pub trait TokenStore {
    fn load(&self, mode: Persistence) -> Option<String>;
    fn save(&self, mode: Persistence, refresh_token: &str);
    fn clear(&self, mode: Persistence);
}

/// In-process slots. Used outside the browser.
#[derive(Default)]
pub struct MemoryTokenStore {
    durable: RefCell<Option<String>>,
    session: RefCell<Option<String>>,
}

impl MemoryTokenStore {
    fn slot(&self, mode: Persistence) -> &RefCell<Option<String>> {
        match mode {
            Persistence::Durable => &self.durable,
            Persistence::Session => &self.session,
        }
    }

    /// What closing the browser does to `sessionStorage`.
    pub fn end_browser_session(&self) {
        self.session.borrow_mut().take();
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, mode: Persistence) -> Option<String> {
        self.slot(mode).borrow().clone()
    }

    fn save(&self, mode: Persistence, refresh_token: &str) {
        *self.slot(mode).borrow_mut() = Some(refresh_token.to_string());
    }

    fn clear(&self, mode: Persistence) {
        self.slot(mode).borrow_mut().take();
    }
}

/// `localStorage` / `sessionStorage` of the current window.
#[cfg(target_arch = "wasm32")]
pub struct BrowserTokenStore;

#[cfg(target_arch = "wasm32")]
impl BrowserTokenStore {
    fn storage(mode: Persistence) -> Option<web_sys::Storage> {
        let window = web_sys::window()?;
        let storage = match mode {
            Persistence::Durable => window.local_storage(),
            Persistence::Session => window.session_storage(),
        };
        storage.ok().flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl TokenStore for BrowserTokenStore {
    fn load(&self, mode: Persistence) -> Option<String> {
        Self::storage(mode)?.get_item(REFRESH_TOKEN_KEY).ok().flatten()
    }

    fn save(&self, mode: Persistence, refresh_token: &str) {
        let saved = Self::storage(mode).map(|s| s.set_item(REFRESH_TOKEN_KEY, refresh_token));
        if !matches!(saved, Some(Ok(()))) {
            tracing::warn!("Could not store the refresh token ({:?})", mode);
        }
    }

    fn clear(&self, mode: Persistence) {
        if let Some(storage) = Self::storage(mode) {
            let _ = storage.remove_item(REFRESH_TOKEN_KEY);
        }
    }
}

/// The browser's storage on wasm, memory elsewhere.
pub fn default_token_store() -> Rc<dyn TokenStore> {
    #[cfg(target_arch = "wasm32")]
    {
        Rc::new(BrowserTokenStore)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Rc::new(MemoryTokenStore::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_are_independent() {
        let tokens = MemoryTokenStore::default();
        tokens.save(Persistence::Durable, "d");
        tokens.save(Persistence::Session, "s");

        tokens.end_browser_session();
        assert_eq!(tokens.load(Persistence::Durable).as_deref(), Some("d"));
        assert_eq!(tokens.load(Persistence::Session), None);

        tokens.clear(Persistence::Durable);
        assert_eq!(tokens.load(Persistence::Durable), None);
    }
}
