//! Error types for store operations.
//!
//! Store errors are opaque to the list engine: it never retries and never inspects them,
//! it only propagates them to the caller.

use thiserror::Error;

/// Errors raised by a [`DocumentStore`](super::DocumentStore) implementation.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record not found in collection
    #[error("Record not found in collection '{collection}': {id}")]
    RecordNotFound { collection: String, id: String },

    /// A record with the same id already exists
    #[error("Duplicate record id in collection '{collection}': {id}")]
    DuplicateId { collection: String, id: String },

    /// Serialization failed for a record
    #[error("Serialization failed in collection '{collection}': {reason}")]
    SerializationFailed { collection: String, reason: String },

    /// Deserialization failed for a record
    #[error("Deserialization failed in collection '{collection}': {reason}")]
    DeserializationFailed { collection: String, reason: String },

    /// A delta update would overflow an integer field
    #[error("Shifting '{field}' of {id} in collection '{collection}' by {delta} overflows")]
    FieldOverflow {
        collection: String,
        id: String,
        field: String,
        delta: i64,
    },

    /// Reading or writing the persistence file failed
    #[error("File I/O error: {source}")]
    FileIo {
        #[source]
        source: std::io::Error,
    },

    /// The persistence file could not be parsed
    #[error("Persistence file is corrupted: {source}")]
    PersistenceCorrupted {
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Check if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::RecordNotFound { .. })
    }

    /// Check if this error indicates a conflicting record id
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::DuplicateId { .. })
    }

    /// Check if this error is related to serialization
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            StoreError::SerializationFailed { .. }
                | StoreError::DeserializationFailed { .. }
                | StoreError::PersistenceCorrupted { .. }
        )
    }

    /// Check if this error is an integer overflow of a delta update
    pub fn is_overflow(&self) -> bool {
        matches!(self, StoreError::FieldOverflow { .. })
    }

    /// Check if this error is I/O related
    pub fn is_io_error(&self) -> bool {
        matches!(self, StoreError::FileIo { .. })
    }

    /// Get the collection name associated with this error, if any
    pub fn collection(&self) -> Option<&str> {
        match self {
            StoreError::RecordNotFound { collection, .. }
            | StoreError::DuplicateId { collection, .. }
            | StoreError::SerializationFailed { collection, .. }
            | StoreError::DeserializationFailed { collection, .. }
            | StoreError::FieldOverflow { collection, .. } => Some(collection),
            StoreError::FileIo { .. } | StoreError::PersistenceCorrupted { .. } => None,
        }
    }
}

// Conversion from StoreError to the main Error type
impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
