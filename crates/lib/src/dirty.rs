//! Change tracking for embedded documents.
//!
//! A [`ChangeSet`] remembers the value an attribute had before it was first written. Two
//! rules differ from naive change recording and matter for embedded documents:
//!
//! - an attribute written back to its original value is not reported as changed, and
//! - every key present on a document counts as an attribute, not only declared keys,
//!   because embedded documents routinely carry keys their type never declared.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::document::Document;

/// Original values of the attributes written since the last [`ChangeSet::clear`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    originals: BTreeMap<String, Value>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the changes that turn `old` into `new`.
    pub fn diff(old: &Document, new: &Document) -> Self {
        let mut changes = Self::new();
        for field in old.keys().chain(new.keys()) {
            if old.get(field) != new.get(field) {
                changes.will_change(field, old);
            }
        }
        changes
    }

    /// Remembers the current value of `field` unless an earlier value is already recorded.
    pub fn will_change(&mut self, field: &str, doc: &Document) {
        self.originals
            .entry(field.to_string())
            .or_insert_with(|| doc.get(field).cloned().unwrap_or(Value::Null));
    }

    /// Writes `value` into `field`, recording the original first.
    pub fn write(&mut self, doc: &mut Document, field: &str, value: Value) {
        self.will_change(field, doc);
        doc.insert(field.to_string(), value);
    }

    /// Original values of the attributes whose current value differs from it.
    pub fn changed_attributes(&self, current: &Document) -> BTreeMap<String, Value> {
        self.originals
            .iter()
            .filter(|(field, original)| {
                current.get(field.as_str()).unwrap_or(&Value::Null) != *original
            })
            .map(|(field, original)| (field.clone(), original.clone()))
            .collect()
    }

    /// Names of the changed attributes.
    pub fn changed(&self, current: &Document) -> Vec<String> {
        self.changed_attributes(current).into_keys().collect()
    }

    pub fn is_changed(&self, current: &Document, field: &str) -> bool {
        self.originals
            .get(field)
            .is_some_and(|original| current.get(field).unwrap_or(&Value::Null) != original)
    }

    pub fn has_changes(&self, current: &Document) -> bool {
        !self.changed_attributes(current).is_empty()
    }

    pub fn clear(&mut self) {
        self.originals.clear();
    }
}

/// Whether `name` is an attribute of `doc`: a declared key or any key the document holds.
pub fn is_attribute(doc: &Document, keys: &[&str], name: &str) -> bool {
    keys.contains(&name) || doc.contains_key(name)
}
