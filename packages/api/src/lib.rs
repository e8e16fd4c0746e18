//! # API crate: the external services the site talks to
//!
//! The site delegates all authentication and persistence to a managed
//! provider. This crate defines the provider-agnostic seam and ships one
//! implementation of it.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`identity`] | always | The [`IdentityProvider`] trait, [`AuthUser`], [`Persistence`] |
//! | [`error`] | always | [`ProviderError`] and the typed [`ProviderErrorKind`] |
//! | [`settings`] | always | [`Settings`] loaded from defaults, `config.toml` and `SITE__*` variables |
//! | `firebase` | `firebase` | `FirebaseAuth` (Identity Toolkit REST) and `Firestore` (Firestore REST) |

pub mod error;
pub mod identity;
pub mod settings;

#[cfg(feature = "firebase")]
pub mod firebase;

pub use error::{ProviderError, ProviderErrorKind};
pub use identity::{AuthUser, FederatedSignIn, IdentityProvider, Persistence};
pub use settings::Settings;
