//! In-memory document store
//!
//! This module provides an in-memory implementation of [`DocumentStore`], suitable for
//! testing, development, and small tools that persist the whole state to a JSON file.

mod persistence;

use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    path::Path,
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{DocumentStore, Filter, StoreError};
use crate::{
    Result,
    document::{Document, RecordId, record_id, set_record_id},
};

/// Documents of one collection, ordered by id.
pub(crate) type CollectionData = BTreeMap<RecordId, Document>;

/// A simple in-memory store keeping every collection in a `BTreeMap` keyed by record id.
///
/// Each operation takes the store-wide lock once, so every single `shift` is atomic. The
/// multi-step sequences of the list engine are serialized by the engine's own scope locks.
#[derive(Debug, Default)]
pub struct InMemory {
    pub(crate) collections: RwLock<HashMap<String, CollectionData>>,
}

impl InMemory {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every collection that holds at least one document.
    pub async fn collection_names(&self) -> Vec<String> {
        let collections = self.collections.read().await;
        let mut names: Vec<String> = collections
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Saves every collection to a file as JSON.
    ///
    /// # Returns
    /// A `Result` indicating success or an I/O or serialization error.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads a store from a JSON file.
    ///
    /// If the file does not exist, a new, empty store is returned.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

fn not_found(collection: &str, id: &RecordId) -> crate::Error {
    StoreError::RecordNotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
    .into()
}

fn compare_by(field: &str, a: &Document, b: &Document) -> Ordering {
    let key = |doc: &Document| doc.get(field).and_then(Value::as_i64);
    match (key(a), key(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| record_id(a).cmp(&record_id(b)))
}

#[async_trait]
impl DocumentStore for InMemory {
    async fn insert(&self, collection: &str, mut doc: Document) -> Result<RecordId> {
        let id = record_id(&doc).unwrap_or_else(RecordId::generate);
        set_record_id(&mut doc, &id);

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&id) {
            return Err(StoreError::DuplicateId {
                collection: collection.to_string(),
                id: id.to_string(),
            }
            .into());
        }
        docs.insert(id.clone(), doc);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &RecordId) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn replace(&self, collection: &str, id: &RecordId, mut doc: Document) -> Result<()> {
        set_record_id(&mut doc, id);
        let mut collections = self.collections.write().await;
        match collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
        {
            Some(existing) => {
                *existing = doc;
                Ok(())
            }
            None => Err(not_found(collection, id)),
        }
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort_by: Option<&str>,
    ) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut found: Vec<Document> = collections
            .get(collection)
            .into_iter()
            .flat_map(|docs| docs.values())
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect();
        if let Some(field) = sort_by {
            found.sort_by(|a, b| compare_by(field, a, b));
        }
        Ok(found)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<usize> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().filter(|doc| filter.matches(doc)).count())
            .unwrap_or(0))
    }

    async fn set_field(
        &self,
        collection: &str,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> Result<()> {
        let mut collections = self.collections.write().await;
        match collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
        {
            Some(doc) => {
                doc.insert(field.to_string(), value);
                Ok(())
            }
            None => Err(not_found(collection, id)),
        }
    }

    async fn shift(
        &self,
        collection: &str,
        filter: &Filter,
        field: &str,
        delta: i64,
    ) -> Result<usize> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let mut updates = Vec::new();
        for (id, doc) in docs.iter().filter(|(_, doc)| filter.matches(doc)) {
            let Some(current) = doc.get(field).and_then(Value::as_i64) else {
                continue;
            };
            let shifted = current
                .checked_add(delta)
                .ok_or_else(|| StoreError::FieldOverflow {
                    collection: collection.to_string(),
                    id: id.to_string(),
                    field: field.to_string(),
                    delta,
                })?;
            updates.push((id.clone(), shifted));
        }
        for (id, shifted) in &updates {
            if let Some(doc) = docs.get_mut(id) {
                doc.insert(field.to_string(), Value::from(*shifted));
            }
        }
        Ok(updates.len())
    }

    async fn remove(&self, collection: &str, id: &RecordId) -> Result<bool> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some())
    }
}
