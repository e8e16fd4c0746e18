//! # Documents, patches and the [`DataStore`] capability
//!
//! The data store is document-oriented: a collection name plus an opaque id
//! addresses one JSON object ([`Document`]). Writes are expressed as a
//! [`Patch`], a map of top-level field names to [`FieldValue`]s. Besides plain
//! values a patch can carry two server-side helpers:
//!
//! | Helper | Meaning |
//! |--------|---------|
//! | [`FieldValue::ServerTimestamp`] | Replaced by the store's clock when the write is applied. |
//! | [`FieldValue::Increment`] | Atomically adds to the stored integer (missing field counts as `0`). |
//!
//! Write semantics follow the document databases this models:
//!
//! - [`set`](DataStore::set) replaces the whole document, creating it if needed.
//! - [`update`](DataStore::update) merges into an existing document and fails with
//!   [`StoreError::NotFound`] when there is none.
//! - [`add`](DataStore::add) creates a document under a store-assigned id.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

/// Collection names used by the site.
pub mod collections {
    pub const USERS: &str = "users";
    pub const CONTACTS: &str = "contacts";
}

/// A stored document: a JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// The value written to a single field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Value(Value),
    ServerTimestamp,
    Increment(i64),
}

/// A set of field writes applied to one document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Patch {
    fields: BTreeMap<String, FieldValue>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a patch from the top-level fields of a serializable struct.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, StoreError> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(map
                .into_iter()
                .map(|(field, value)| (field, FieldValue::Value(value)))
                .collect()),
            other => Err(StoreError::NotAnObject(other.to_string())),
        }
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields
            .insert(field.into(), FieldValue::Value(value.into()));
        self
    }

    pub fn server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into(), FieldValue::ServerTimestamp);
        self
    }

    pub fn increment(mut self, field: impl Into<String>, by: i64) -> Self {
        self.fields.insert(field.into(), FieldValue::Increment(by));
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for Patch {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Patch {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// Errors raised by a [`DataStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },
    #[error("document {collection}/{id} already exists")]
    AlreadyExists { collection: String, id: String },
    #[error("cannot increment non-numeric field `{0}`")]
    NotNumeric(String),
    #[error("expected a JSON object, got {0}")]
    NotAnObject(String),
    #[error("failed to encode or decode document: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("data store requires a signed-in user")]
    Unauthenticated,
    #[error("data store request failed: {0}")]
    Backend(String),
}

/// Async document store, keyed by collection and document id.
#[async_trait(?Send)]
pub trait DataStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;
    async fn set(&self, collection: &str, id: &str, patch: Patch) -> Result<(), StoreError>;
    async fn update(&self, collection: &str, id: &str, patch: Patch) -> Result<(), StoreError>;
    async fn add(&self, collection: &str, patch: Patch) -> Result<String, StoreError>;
}
