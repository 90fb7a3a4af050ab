//! Scope resolution.
//!
//! A scope is the set of records that share one ordering. It is identified by the current
//! values of the configured scope fields, read fresh from the document on every operation.
//! `null` and missing values are ordinary, matchable scope values.

use std::{collections::BTreeMap, fmt};

use serde_json::{Map, Value};

use crate::{config::ListConfig, document::Document, store::Filter};

/// The values identifying one scope, keyed by field name.
///
/// Two records are in the same list exactly when their scope keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopeKey(BTreeMap<String, Value>);

impl ScopeKey {
    /// Value of one scope field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// True for the single list of an unscoped collection.
    pub fn is_global(&self) -> bool {
        self.0.is_empty()
    }

    /// Equality filter selecting every document of this scope.
    pub fn filter(&self) -> Filter {
        self.0
            .iter()
            .fold(Filter::new(), |filter, (field, value)| {
                filter.eq(field.clone(), value.clone())
            })
    }

    /// Canonical string form, stable across equal keys.
    pub fn fingerprint(&self) -> String {
        let map: Map<String, Value> = self
            .0
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Value::Object(map).to_string()
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fingerprint())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ScopeKey {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Computes scope keys for a list configuration.
#[derive(Debug, Clone)]
pub struct ScopeResolver {
    fields: Vec<String>,
}

impl ScopeResolver {
    pub fn new(config: &ListConfig) -> Self {
        Self {
            fields: config.scope_field_names().map(str::to_string).collect(),
        }
    }

    /// Reads the scope key of a document from its current field values.
    pub fn resolve(&self, doc: &Document) -> ScopeKey {
        ScopeKey(
            self.fields
                .iter()
                .map(|field| {
                    let value = doc.get(field).cloned().unwrap_or(Value::Null);
                    (field.clone(), value)
                })
                .collect(),
        )
    }

    pub fn same_scope(&self, a: &Document, b: &Document) -> bool {
        self.resolve(a) == self.resolve(b)
    }
}
