//! List engine errors.

use thiserror::Error;

/// Errors raised by the list engine itself.
///
/// Failures of the backing store are not wrapped here; they propagate unchanged as
/// [`StoreError`](crate::store::StoreError)s.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ListError {
    /// The record addressed by an operation is not stored
    #[error("Record {id} not found in collection '{collection}'")]
    NotInStore { collection: String, id: String },

    /// A stored document has no usable `_id`
    #[error("Document in collection '{collection}' has no record id")]
    MissingRecordId { collection: String },

    /// A stored position is neither null nor an integer
    #[error("Field '{field}' holds {value}, expected an integer position")]
    InvalidPosition { field: String, value: String },

    /// Positions of a scope are not exactly 1..=N
    #[error("Positions in scope {scope} are not dense: {positions:?}")]
    InvariantViolation { scope: String, positions: Vec<i64> },
}

impl ListError {
    /// Check if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, ListError::NotInStore { .. })
    }

    /// Check if this error reports a list with gaps or duplicate positions
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, ListError::InvariantViolation { .. })
    }

    /// Check if this error was caused by malformed stored data
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            ListError::MissingRecordId { .. } | ListError::InvalidPosition { .. }
        )
    }
}

impl From<ListError> for crate::Error {
    fn from(err: ListError) -> Self {
        crate::Error::List(err)
    }
}
