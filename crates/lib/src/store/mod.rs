//! Backing store abstraction.
//!
//! The list engine never owns record storage. It reads and writes the position field through
//! a [`DocumentStore`], which models the handful of document-database operations it relies
//! on: filtered queries sorted by an integer field, counts, field-level writes, and
//! range-guarded delta updates (`field = field + delta`).
//!
//! All stores must be `Send` and `Sync` so one store can back many lists across tasks.

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    Result,
    document::{Document, RecordId},
};

mod errors;
pub use errors::StoreError;

mod filter;
pub use filter::{Condition, Filter};

mod in_memory;
pub use in_memory::InMemory;

/// Document database operations consumed by Listkeeper.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a document and returns its id.
    ///
    /// A document that already carries an `_id` keeps it; otherwise a fresh id is generated
    /// and stamped onto the stored document.
    ///
    /// # Errors
    /// Returns `StoreError::DuplicateId` if a record with the same id exists.
    async fn insert(&self, collection: &str, doc: Document) -> Result<RecordId>;

    /// Fetches one document by id, or `None` when it does not exist.
    async fn get(&self, collection: &str, id: &RecordId) -> Result<Option<Document>>;

    /// Replaces a whole document, keeping its id.
    ///
    /// # Errors
    /// Returns `StoreError::RecordNotFound` if the id is absent.
    async fn replace(&self, collection: &str, id: &RecordId, doc: Document) -> Result<()>;

    /// Returns all documents matching `filter`.
    ///
    /// When `sort_by` names a field, results are ordered by its integer value ascending,
    /// documents without an integer value last, ties broken by id.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort_by: Option<&str>,
    ) -> Result<Vec<Document>>;

    /// Counts documents matching `filter`.
    async fn count(&self, collection: &str, filter: &Filter) -> Result<usize>;

    /// Writes a single field of one document.
    ///
    /// # Errors
    /// Returns `StoreError::RecordNotFound` if the id is absent.
    async fn set_field(
        &self,
        collection: &str,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> Result<()>;

    /// Adds `delta` to the integer `field` of every document matching `filter`.
    ///
    /// Documents whose field is not an integer are left untouched. Returns the number of
    /// documents changed. A single call must be applied atomically: if any document would
    /// overflow, nothing is changed and `StoreError::FieldOverflow` is returned.
    async fn shift(&self, collection: &str, filter: &Filter, field: &str, delta: i64)
    -> Result<usize>;

    /// Removes a document. Returns `false` if it did not exist.
    async fn remove(&self, collection: &str, id: &RecordId) -> Result<bool>;
}
