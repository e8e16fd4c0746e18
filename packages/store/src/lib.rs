//! Document storage for the site: the [`DataStore`] capability, the records
//! kept in it, and the profile helpers built on top.

pub mod document;
pub mod models;
pub mod profile;

mod memory;
pub use memory::MemoryStore;

pub use document::{collections, DataStore, Document, FieldValue, Patch, StoreError};
pub use models::{
    profile_is_complete, split_display_name, AccountStatus, ContactSubmission, Preferences,
    ProfileUpdate, Role, SignInProvider, UserRecord, UserStats,
};
