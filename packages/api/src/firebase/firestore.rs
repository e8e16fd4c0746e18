//! # Cloud Firestore over its REST API
//!
//! [`Firestore`] implements [`DataStore`]. Reads are a plain `GET` on the
//! document; every write goes through `documents:commit` so that server
//! timestamps and increments can ride along as `updateTransforms`:
//!
//! | Operation | Write shape |
//! |-----------|-------------|
//! | `set` | full `update`, no mask |
//! | `update` | `update` + `updateMask` of the plain fields + `currentDocument.exists = true` |
//! | `add` | client-generated id + `currentDocument.exists = false` |
//!
//! Firestore wraps every value in a typed envelope (`stringValue`,
//! `integerValue` as a decimal string, `mapValue.fields`, ...).
//! [`encode_value`] and [`decode_value`] translate between that and plain JSON;
//! timestamps decode to their RFC 3339 string.
//!
//! Requests carry the signed-in user's ID token when there is one, so
//! security rules can tell users apart. Anonymous writes (the contact form)
//! go out without it.

use std::rc::Rc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use store::{DataStore, Document, FieldValue, Patch, StoreError};

use super::FirebaseAuth;
use crate::settings::Firebase;

#[derive(Debug, Deserialize)]
struct RestDocument {
    #[serde(default)]
    fields: Map<String, Value>,
}

fn backend(e: reqwest::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Encode plain JSON as a Firestore value envelope.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => json!({ "integerValue": i.to_string() }),
            (None, Some(u)) => json!({ "integerValue": u.to_string() }),
            _ => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

fn encode_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(field, value)| (field.clone(), encode_value(value)))
        .collect()
}

/// Decode a Firestore value envelope into plain JSON.
pub fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let malformed = || StoreError::Backend(format!("malformed Firestore value: {value}"));
    let (kind, inner) = value
        .as_object()
        .and_then(|envelope| envelope.iter().next())
        .ok_or_else(malformed)?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "integerValue" => match inner {
            Value::String(s) => s.parse::<i64>().map(Value::from).map_err(|_| malformed()),
            Value::Number(_) => Ok(inner.clone()),
            _ => Err(malformed()),
        },
        "booleanValue" | "doubleValue" | "stringValue" | "timestampValue" | "referenceValue"
        | "bytesValue" | "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => inner
            .get("values")
            .and_then(Value::as_array)
            .map_or(Ok(Vec::new()), |values| values.iter().map(decode_value).collect())
            .map(Value::Array),
        "mapValue" => match inner.get("fields").and_then(Value::as_object) {
            Some(fields) => decode_fields(fields).map(Value::Object),
            None => Ok(Value::Object(Map::new())),
        },
        _ => Err(malformed()),
    }
}

fn decode_fields(fields: &Map<String, Value>) -> Result<Document, StoreError> {
    fields
        .iter()
        .map(|(field, value)| Ok((field.clone(), decode_value(value)?)))
        .collect()
}

/// Backtick-quote a field name unless it is a simple identifier.
fn field_path(field: &str) -> String {
    let simple = field
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        field.to_string()
    } else {
        format!("`{}`", field.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

/// Precondition attached to a commit write.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Precondition {
    None,
    Exists,
    Missing,
}

/// Build one `documents:commit` write for `patch` against document `name`.
fn build_write(name: &str, patch: Patch, masked: bool, precondition: Precondition) -> Value {
    let mut fields = Map::new();
    let mut transforms = Vec::new();
    for (field, value) in patch {
        match value {
            FieldValue::Value(value) => {
                fields.insert(field, encode_value(&value));
            }
            FieldValue::ServerTimestamp => transforms.push(json!({
                "fieldPath": field_path(&field),
                "setToServerValue": "REQUEST_TIME",
            })),
            FieldValue::Increment(by) => transforms.push(json!({
                "fieldPath": field_path(&field),
                "increment": { "integerValue": by.to_string() },
            })),
        }
    }

    let mask: Vec<String> = fields.keys().map(|field| field_path(field)).collect();
    let mut write = json!({ "update": { "name": name, "fields": fields } });
    if masked {
        write["updateMask"] = json!({ "fieldPaths": mask });
    }
    if !transforms.is_empty() {
        write["updateTransforms"] = Value::Array(transforms);
    }
    match precondition {
        Precondition::None => {}
        Precondition::Exists => write["currentDocument"] = json!({ "exists": true }),
        Precondition::Missing => write["currentDocument"] = json!({ "exists": false }),
    }
    write
}

/// Firestore client scoped to one project's default database.
pub struct Firestore {
    http: reqwest::Client,
    documents_url: String,
    database: String,
    auth: Rc<FirebaseAuth>,
}

impl Firestore {
    pub fn new(config: &Firebase, auth: Rc<FirebaseAuth>) -> Self {
        Self {
            http: reqwest::Client::new(),
            documents_url: config.documents_url(),
            database: format!("projects/{}/databases/(default)/documents", config.project_id),
            auth,
        }
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.database, collection, id)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth.id_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn commit(&self, write: Value, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = format!("{}:commit", self.documents_url);
        let response = self
            .authorized(self.http.post(&url))
            .json(&json!({ "writes": [write] }))
            .send()
            .await
            .map_err(backend)?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
            StatusCode::CONFLICT => Err(StoreError::AlreadyExists {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
            StatusCode::UNAUTHORIZED => Err(StoreError::Unauthenticated),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(StoreError::Backend(format!("{status}: {body}")))
            }
        }
    }
}

#[async_trait(?Send)]
impl DataStore for Firestore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let url = format!("{}/{}/{}", self.documents_url, collection, id);
        let response = self
            .authorized(self.http.get(&url))
            .send()
            .await
            .map_err(backend)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let doc: RestDocument = response.json().await.map_err(backend)?;
                decode_fields(&doc.fields).map(Some)
            }
            StatusCode::UNAUTHORIZED => Err(StoreError::Unauthenticated),
            status => Err(StoreError::Backend(status.to_string())),
        }
    }

    async fn set(&self, collection: &str, id: &str, patch: Patch) -> Result<(), StoreError> {
        let write = build_write(
            &self.document_name(collection, id),
            patch,
            false,
            Precondition::None,
        );
        self.commit(write, collection, id).await
    }

    async fn update(&self, collection: &str, id: &str, patch: Patch) -> Result<(), StoreError> {
        let write = build_write(
            &self.document_name(collection, id),
            patch,
            true,
            Precondition::Exists,
        );
        self.commit(write, collection, id).await
    }

    async fn add(&self, collection: &str, patch: Patch) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let write = build_write(
            &self.document_name(collection, &id),
            patch,
            false,
            Precondition::Missing,
        );
        self.commit(write, collection, &id).await?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_travel_as_strings() {
        assert_eq!(encode_value(&json!(6)), json!({ "integerValue": "6" }));
        assert_eq!(
            decode_value(&json!({ "integerValue": "6" })).unwrap(),
            json!(6)
        );
        assert_eq!(encode_value(&json!(1.5)), json!({ "doubleValue": 1.5 }));
    }

    #[test]
    fn test_nested_preferences_decode() {
        let envelope = json!({
            "mapValue": { "fields": {
                "newsletter": { "booleanValue": true },
                "theme": { "stringValue": "dark" },
                "tags": { "arrayValue": {} }
            }}
        });
        assert_eq!(
            decode_value(&envelope).unwrap(),
            json!({ "newsletter": true, "theme": "dark", "tags": [] })
        );
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        assert!(decode_value(&json!({ "integerValue": "six" })).is_err());
        assert!(decode_value(&json!("bare")).is_err());
    }

    #[test]
    fn test_update_write_masks_plain_fields_and_transforms_the_rest() {
        let patch = Patch::new()
            .set("firstName", "Asha")
            .server_timestamp("lastLoginAt")
            .increment("loginCount", 1);

        let write = build_write(
            "projects/p/databases/(default)/documents/users/u1",
            patch,
            true,
            Precondition::Exists,
        );

        assert_eq!(write["updateMask"], json!({ "fieldPaths": ["firstName"] }));
        assert_eq!(write["currentDocument"], json!({ "exists": true }));
        assert_eq!(
            write["update"]["fields"]["firstName"],
            json!({ "stringValue": "Asha" })
        );
        assert_eq!(
            write["updateTransforms"],
            json!([
                { "fieldPath": "lastLoginAt", "setToServerValue": "REQUEST_TIME" },
                { "fieldPath": "loginCount", "increment": { "integerValue": "1" } }
            ])
        );
    }

    #[test]
    fn test_set_write_has_no_mask() {
        let write = build_write("doc", Patch::new().set("a", 1), false, Precondition::None);
        assert!(write.get("updateMask").is_none());
        assert!(write.get("updateTransforms").is_none());
        assert!(write.get("currentDocument").is_none());
    }

    #[test]
    fn test_field_path_quoting() {
        assert_eq!(field_path("photoURL"), "photoURL");
        assert_eq!(field_path("first name"), "`first name`");
        assert_eq!(field_path("1st"), "`1st`");
    }
}
