//! Persistence operations for the InMemory store
//!
//! This module handles serialization and file I/O for saving/loading
//! the in-memory store state to/from JSON files.

use std::{collections::HashMap, path::Path};

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::RwLock;

use super::{CollectionData, InMemory};
use crate::{Error, Result, store::StoreError};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// Serializable version of the InMemory store
#[derive(Serialize, Deserialize)]
struct SerializableStore {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    #[serde(default)]
    collections: HashMap<String, CollectionData>,
}

/// Pretty-prints a value for the store file. Failures are serialization errors, never
/// file corruption.
fn encode<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Saves every collection to a file as pretty-printed JSON.
pub(crate) async fn save_to_file<P: AsRef<Path>>(store: &InMemory, path: P) -> Result<()> {
    let collections = store.collections.read().await.clone();
    let document_count: usize = collections.values().map(|docs| docs.len()).sum();

    let serializable = SerializableStore {
        version: PERSISTENCE_VERSION,
        collections,
    };

    let json = encode(&serializable)?;
    tokio::fs::write(path.as_ref(), json)
        .await
        .map_err(|e| -> Error { StoreError::FileIo { source: e }.into() })?;
    tracing::info!(path = %path.as_ref().display(), document_count, "Saved store");
    Ok(())
}

/// Loads a store from a JSON file, or an empty store if the file does not exist.
pub(crate) async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemory> {
    match tokio::fs::read_to_string(path.as_ref()).await {
        Ok(json) => {
            let serializable: SerializableStore = serde_json::from_str(&json)
                .map_err(|e| -> Error { StoreError::PersistenceCorrupted { source: e }.into() })?;
            Ok(InMemory {
                collections: RwLock::new(serializable.collections),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.as_ref().display(), "No store file, starting empty");
            Ok(InMemory::new())
        }
        Err(e) => Err(StoreError::FileIo { source: e }.into()),
    }
}
