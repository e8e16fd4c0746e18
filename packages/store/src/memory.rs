use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::document::{DataStore, Document, FieldValue, Patch, StoreError};

type Collections = HashMap<String, BTreeMap<String, Document>>;

/// In-memory DataStore for testing and offline fallback.
///
/// Server timestamps come from the wall clock unless a fixed time is set with
/// [`MemoryStore::set_time`].
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<Collections>>,
    fixed_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    unavailable: Arc<AtomicBool>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Freeze the clock used for server timestamps.
    pub fn set_time(&self, now: DateTime<Utc>) {
        *lock(&self.fixed_time) = Some(now);
    }

    /// Make every write fail with [`StoreError::Backend`], as an unreachable backend would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of a stored document.
    pub fn document(&self, collection: &str, id: &str) -> Option<Document> {
        lock(&self.collections)
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    pub fn len(&self, collection: &str) -> usize {
        lock(&self.collections)
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn now(&self) -> DateTime<Utc> {
        lock(&self.fixed_time).unwrap_or_else(Utc::now)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("memory store is unavailable".to_string()));
        }
        Ok(())
    }
}

/// Resolve a patch against a document, applying server-side helpers.
fn apply_patch(doc: &mut Document, patch: Patch, now: DateTime<Utc>) -> Result<(), StoreError> {
    for (field, value) in patch {
        let resolved = match value {
            FieldValue::Value(value) => value,
            FieldValue::ServerTimestamp => {
                Value::String(now.to_rfc3339_opts(SecondsFormat::Micros, true))
            }
            FieldValue::Increment(by) => {
                let current = match doc.get(&field) {
                    None | Some(Value::Null) => 0,
                    Some(existing) => existing
                        .as_i64()
                        .ok_or_else(|| StoreError::NotNumeric(field.clone()))?,
                };
                Value::from(current + by)
            }
        };
        doc.insert(field, resolved);
    }
    Ok(())
}

#[async_trait(?Send)]
impl DataStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.document(collection, id))
    }

    async fn set(&self, collection: &str, id: &str, patch: Patch) -> Result<(), StoreError> {
        self.check_available()?;
        let mut doc = Document::new();
        apply_patch(&mut doc, patch, self.now())?;
        lock(&self.collections)
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Patch) -> Result<(), StoreError> {
        self.check_available()?;
        let now = self.now();
        let mut collections = lock(&self.collections);
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        // Work on a copy so a failed increment leaves the document untouched.
        let mut updated = doc.clone();
        apply_patch(&mut updated, patch, now)?;
        *doc = updated;
        Ok(())
    }

    async fn add(&self, collection: &str, patch: Patch) -> Result<String, StoreError> {
        self.check_available()?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        let mut doc = Document::new();
        apply_patch(&mut doc, patch, self.now())?;
        lock(&self.collections)
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), doc);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.set_time(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap());
        store
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = fixed_store();

        assert!(store.get("users", "u1").await.unwrap().is_none());

        store
            .set(
                "users",
                "u1",
                Patch::new().set("email", "a@b.com").server_timestamp("createdAt"),
            )
            .await
            .unwrap();

        let doc = store.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(doc["email"], "a@b.com");
        assert_eq!(doc["createdAt"], "2024-05-01T09:30:00.000000Z");
    }

    #[tokio::test]
    async fn test_set_replaces_document() {
        let store = fixed_store();
        store
            .set("users", "u1", Patch::new().set("a", 1).set("b", 2))
            .await
            .unwrap();
        store
            .set("users", "u1", Patch::new().set("a", 3))
            .await
            .unwrap();

        let doc = store.document("users", "u1").unwrap();
        assert_eq!(doc["a"], 3);
        assert!(doc.get("b").is_none());
    }

    #[tokio::test]
    async fn test_update_merges_and_increments() {
        let store = fixed_store();
        store
            .set("users", "u1", Patch::new().set("loginCount", 5).set("email", "a@b.com"))
            .await
            .unwrap();

        store
            .update(
                "users",
                "u1",
                Patch::new()
                    .increment("loginCount", 1)
                    .server_timestamp("lastLoginAt"),
            )
            .await
            .unwrap();

        let doc = store.document("users", "u1").unwrap();
        assert_eq!(doc["loginCount"], 6);
        assert_eq!(doc["email"], "a@b.com");
        assert_eq!(doc["lastLoginAt"], "2024-05-01T09:30:00.000000Z");
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let store = fixed_store();
        let err = store
            .update("users", "nobody", Patch::new().increment("loginCount", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_increment_non_numeric_leaves_document() {
        let store = fixed_store();
        store
            .set("users", "u1", Patch::new().set("loginCount", "many").set("x", 1))
            .await
            .unwrap();

        let err = store
            .update(
                "users",
                "u1",
                Patch::new().set("x", 2).increment("loginCount", 1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotNumeric(field) if field == "loginCount"));
        assert_eq!(store.document("users", "u1").unwrap()["x"], 1);
    }

    #[tokio::test]
    async fn test_add_assigns_ids() {
        let store = fixed_store();
        let first = store
            .add("contacts", Patch::new().set("name", "A"))
            .await
            .unwrap();
        let second = store
            .add("contacts", Patch::new().set("name", "B"))
            .await
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(store.len("contacts"), 2);
        assert_eq!(store.document("contacts", &second).unwrap()["name"], "B");
    }

    #[tokio::test]
    async fn test_unavailable_store_rejects_writes() {
        let store = fixed_store();
        store.set_unavailable(true);

        let err = store
            .set("users", "u1", Patch::new().set("a", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert!(store.is_empty("users"));
    }
}
