//! Records as JSON documents.
//!
//! Every record lives in its store as a [`Document`], a JSON object keyed by field name.
//! The reserved `_id` field carries the [`RecordId`]; inheritance-aware record types also
//! carry their type name in `_type`.

use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    Result,
    constants::{ID_FIELD, TYPE_FIELD},
    store::StoreError,
};

/// A stored record: field name to JSON value.
pub type Document = Map<String, Value>;

/// Identifier of a record within its collection.
///
/// Generated ids are UUIDv4 strings, but any string read back from a store is accepted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A record type stored in a document collection.
///
/// `KEYS` declares the attribute names of the type. List configuration is validated against
/// it when a [`List`](crate::List) is built, so a misspelled scope field fails at setup rather
/// than silently scoping every record to `null`.
///
/// # Example
///
/// ```
/// use listkeeper::Model;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Task {
///     title: String,
///     project: String,
///     position: Option<i64>,
/// }
///
/// impl Model for Task {
///     const COLLECTION: &'static str = "tasks";
///     const KEYS: &'static [&'static str] = &["title", "project", "position"];
/// }
/// ```
pub trait Model: Serialize + DeserializeOwned + Send + Sync {
    /// Name of the collection holding records of this type.
    const COLLECTION: &'static str;

    /// Declared attribute names.
    const KEYS: &'static [&'static str];

    /// Type discriminator written to `_type`, for types sharing a collection.
    const TYPE_NAME: Option<&'static str> = None;

    /// Serializes the record into a document, tagging it with `TYPE_NAME` when set.
    fn to_document(&self) -> Result<Document> {
        let value = serde_json::to_value(self).map_err(|e| StoreError::SerializationFailed {
            collection: Self::COLLECTION.to_string(),
            reason: format!("Failed to serialize record: {e}"),
        })?;
        let Value::Object(mut doc) = value else {
            return Err(StoreError::SerializationFailed {
                collection: Self::COLLECTION.to_string(),
                reason: "record did not serialize to an object".to_string(),
            }
            .into());
        };
        if let Some(type_name) = Self::TYPE_NAME {
            doc.insert(TYPE_FIELD.to_string(), Value::from(type_name));
        }
        Ok(doc)
    }

    /// Deserializes a record from a stored document. Reserved fields are ignored unless the
    /// type declares them.
    fn from_document(doc: &Document) -> Result<Self> {
        serde_json::from_value(Value::Object(doc.clone())).map_err(|e| {
            StoreError::DeserializationFailed {
                collection: Self::COLLECTION.to_string(),
                reason: format!(
                    "Failed to deserialize record '{}': {e}",
                    record_id(doc).map(|id| id.to_string()).unwrap_or_default()
                ),
            }
            .into()
        })
    }
}

/// Reads the record id of a document, if it has one.
pub fn record_id(doc: &Document) -> Option<RecordId> {
    doc.get(ID_FIELD)
        .and_then(Value::as_str)
        .map(RecordId::from)
}

/// Stamps a record id onto a document.
pub fn set_record_id(doc: &mut Document, id: &RecordId) {
    doc.insert(ID_FIELD.to_string(), Value::from(id.as_str()));
}
