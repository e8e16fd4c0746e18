//! User profile reads and writes against any [`DataStore`].
//!
//! Every write that changes profile content stamps `updatedAt`. The login
//! and activity stamps only touch their own fields.

use serde_json::Value;

use crate::document::{collections::USERS, DataStore, Patch, StoreError};
use crate::models::{Preferences, ProfileUpdate, UserRecord};

/// Load a user's record, `None` when the user has no document yet.
pub async fn get_user_profile(
    store: &dyn DataStore,
    uid: &str,
) -> Result<Option<UserRecord>, StoreError> {
    match store.get(USERS, uid).await? {
        Some(doc) => Ok(Some(serde_json::from_value(Value::Object(doc))?)),
        None => Ok(None),
    }
}

/// Write a brand-new user record.
pub async fn create_user_profile(
    store: &dyn DataStore,
    uid: &str,
    record: &UserRecord,
) -> Result<(), StoreError> {
    store.set(USERS, uid, record.creation_patch()?).await
}

pub async fn update_user_profile(
    store: &dyn DataStore,
    uid: &str,
    update: &ProfileUpdate,
) -> Result<(), StoreError> {
    let patch = Patch::from_serializable(update)?.server_timestamp("updatedAt");
    store.update(USERS, uid, patch).await
}

/// Replace the stored preferences as a whole.
pub async fn update_user_preferences(
    store: &dyn DataStore,
    uid: &str,
    preferences: &Preferences,
) -> Result<(), StoreError> {
    let patch = Patch::new()
        .set("preferences", serde_json::to_value(preferences)?)
        .server_timestamp("updatedAt");
    store.update(USERS, uid, patch).await
}

/// Stamp a successful authentication: login and activity times, plus one login.
pub async fn record_login(store: &dyn DataStore, uid: &str) -> Result<(), StoreError> {
    let patch = Patch::new()
        .server_timestamp("lastLoginAt")
        .server_timestamp("lastActiveAt")
        .increment("loginCount", 1);
    store.update(USERS, uid, patch).await
}

/// Best-effort `lastActiveAt` stamp. Failures are logged and dropped.
pub async fn touch_user_activity(store: &dyn DataStore, uid: &str) {
    let patch = Patch::new().server_timestamp("lastActiveAt");
    if let Err(e) = store.update(USERS, uid, patch).await {
        tracing::warn!("Could not update user activity for {}: {}", uid, e);
    }
}
