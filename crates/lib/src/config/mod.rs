//! List configuration.
//!
//! A [`ListConfig`] names the position field and the fields that partition a collection
//! into independent lists. It is plain data, serde-(de)serializable so it can be loaded from
//! JSON, and is shared as `Arc<ListConfig>` by every record type stored in the same
//! collection.

mod errors;
pub use errors::ConfigError;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    Model,
    constants::{DEFAULT_POSITION_FIELD, ID_FIELD, TYPE_FIELD},
};

/// One component of a list scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeField {
    /// A declared attribute of the record type.
    Field(String),
    /// The implicit `_type` discriminator of inheritance-aware record types.
    Type,
}

impl ScopeField {
    /// The document field this component reads.
    pub fn field_name(&self) -> &str {
        match self {
            ScopeField::Field(name) => name,
            ScopeField::Type => TYPE_FIELD,
        }
    }
}

/// Position field and scope of a list.
///
/// # Example
///
/// ```
/// use listkeeper::{ListConfig, ScopeField};
///
/// let config = ListConfig::new().position_field("rank").scope("board").scope("column");
/// assert_eq!(config.position_field, "rank");
/// assert_eq!(config.scope[1], ScopeField::Field("column".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Integer field holding the 1-based position.
    pub position_field: String,
    /// Fields partitioning the collection into lists. Empty means one list per collection.
    pub scope: Vec<ScopeField>,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            position_field: DEFAULT_POSITION_FIELD.to_string(),
            scope: Vec::new(),
        }
    }
}

impl ListConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position_field(mut self, field: impl Into<String>) -> Self {
        self.position_field = field.into();
        self
    }

    /// Adds an attribute to the scope.
    pub fn scope(mut self, field: impl Into<String>) -> Self {
        self.scope.push(ScopeField::Field(field.into()));
        self
    }

    /// Adds the `_type` discriminator to the scope.
    pub fn scope_by_type(mut self) -> Self {
        self.scope.push(ScopeField::Type);
        self
    }

    /// Document field names making up the scope, in configuration order.
    pub fn scope_field_names(&self) -> impl Iterator<Item = &str> {
        self.scope.iter().map(ScopeField::field_name)
    }

    /// Validates this configuration against a record type.
    pub fn validate<M: Model>(&self) -> Result<(), ConfigError> {
        self.validate_keys(M::COLLECTION, M::KEYS, M::TYPE_NAME.is_some())
    }

    /// Validates this configuration against a set of declared keys.
    ///
    /// # Errors
    /// Any of the [`ConfigError`] variants describing the first problem found.
    pub fn validate_keys(
        &self,
        model: &str,
        keys: &[&str],
        has_type_name: bool,
    ) -> Result<(), ConfigError> {
        let position = self.position_field.as_str();
        if position == ID_FIELD || position == TYPE_FIELD {
            return Err(ConfigError::ReservedField {
                field: position.to_string(),
            });
        }
        if !keys.contains(&position) {
            return Err(ConfigError::UnknownPositionField {
                model: model.to_string(),
                field: position.to_string(),
            });
        }

        let mut seen = HashSet::new();
        for scope in &self.scope {
            let name = scope.field_name();
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateScopeField {
                    field: name.to_string(),
                });
            }
            if name == position {
                return Err(ConfigError::PositionFieldInScope {
                    field: name.to_string(),
                });
            }
            match scope {
                ScopeField::Type if !has_type_name => {
                    return Err(ConfigError::MissingTypeName {
                        model: model.to_string(),
                    });
                }
                ScopeField::Field(field) if !keys.contains(&field.as_str()) => {
                    return Err(ConfigError::UnknownScopeField {
                        model: model.to_string(),
                        field: field.clone(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}
