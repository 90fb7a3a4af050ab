//! Query filters understood by every store.
//!
//! A [`Filter`] is a conjunction of [`Condition`]s. It is deliberately small: equality on
//! scope fields, exclusion of a single record, and inclusive integer ranges on the position
//! field are all the list engine needs.

use serde_json::Value;

use crate::document::Document;

/// A single predicate on one document field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value. A missing field compares equal to `null`.
    Eq { field: String, value: Value },
    /// Field differs from the value. A missing field compares as `null`.
    Ne { field: String, value: Value },
    /// Field is present and not `null`.
    NotNull { field: String },
    /// Field holds an integer within `min..=max`. Open ends are unbounded.
    Range {
        field: String,
        min: Option<i64>,
        max: Option<i64>,
    },
}

impl Condition {
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Condition::Eq { field, value } => doc.get(field).unwrap_or(&Value::Null) == value,
            Condition::Ne { field, value } => doc.get(field).unwrap_or(&Value::Null) != value,
            Condition::NotNull { field } => doc.get(field).is_some_and(|v| !v.is_null()),
            Condition::Range { field, min, max } => {
                match doc.get(field).and_then(Value::as_i64) {
                    Some(n) => min.is_none_or(|min| n >= min) && max.is_none_or(|max| n <= max),
                    None => false,
                }
            }
        }
    }
}

/// Conjunction of conditions. The empty filter matches every document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn ne(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Ne {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn not_null(mut self, field: impl Into<String>) -> Self {
        self.conditions.push(Condition::NotNull {
            field: field.into(),
        });
        self
    }

    pub fn range(mut self, field: impl Into<String>, min: Option<i64>, max: Option<i64>) -> Self {
        self.conditions.push(Condition::Range {
            field: field.into(),
            min,
            max,
        });
        self
    }

    /// Appends every condition of `other`.
    pub fn and(mut self, other: Filter) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }
}
