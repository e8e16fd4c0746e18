//! Firebase REST adapters for the identity provider and data store capabilities.

mod auth;
mod firestore;
pub mod google;
mod tokens;

pub use auth::{kind_from_rest, FirebaseAuth};
pub use firestore::{decode_value, encode_value, Firestore};
pub use tokens::{default_token_store, MemoryTokenStore, TokenStore, REFRESH_TOKEN_KEY};
#[cfg(target_arch = "wasm32")]
pub use tokens::BrowserTokenStore;
