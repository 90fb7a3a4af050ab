//! Configuration errors.
//!
//! These are raised eagerly when a list is set up and are not meant to be recovered from:
//! a list whose scope names a field the record type does not have would silently put every
//! record into the same `null` scope.

use thiserror::Error;

/// Errors detected while validating a [`ListConfig`](super::ListConfig) against a record type.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Position field is not declared by the record type
    #[error("Position field '{field}' is not a key of model '{model}'")]
    UnknownPositionField { model: String, field: String },

    /// Scope field is not declared by the record type
    #[error("Scope field '{field}' is not a key of model '{model}'")]
    UnknownScopeField { model: String, field: String },

    /// The same scope field was configured twice
    #[error("Scope field '{field}' is configured more than once")]
    DuplicateScopeField { field: String },

    /// Type scoping requires a type discriminator on the record type
    #[error("Model '{model}' is scoped by type but declares no type name")]
    MissingTypeName { model: String },

    /// The position field cannot also scope the list
    #[error("Field '{field}' cannot be both the position field and a scope field")]
    PositionFieldInScope { field: String },

    /// Reserved document fields cannot hold positions
    #[error("Field '{field}' is reserved and cannot be used as the position field")]
    ReservedField { field: String },

    /// A record type was attached to a list over another collection
    #[error("Model collection '{model}' does not match list collection '{list}'")]
    CollectionMismatch { model: String, list: String },
}

impl ConfigError {
    /// Check if this error names a field the record type does not declare
    pub fn is_unknown_field(&self) -> bool {
        matches!(
            self,
            ConfigError::UnknownPositionField { .. } | ConfigError::UnknownScopeField { .. }
        )
    }

    /// Get the offending field name, if the error is about a single field
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::UnknownPositionField { field, .. }
            | ConfigError::UnknownScopeField { field, .. }
            | ConfigError::DuplicateScopeField { field }
            | ConfigError::PositionFieldInScope { field }
            | ConfigError::ReservedField { field } => Some(field),
            ConfigError::MissingTypeName { .. } | ConfigError::CollectionMismatch { .. } => None,
        }
    }
}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::Config(err)
    }
}
