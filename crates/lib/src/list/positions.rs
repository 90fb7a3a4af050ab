//! Position store adapter.
//!
//! Reads and writes the configured position field of one collection through the backing
//! store. Every sibling update is a range-guarded delta (`position = position ± 1` for
//! positions inside `min..=max`), never a blind rewrite.

use serde_json::Value;
use tracing::debug;

use super::ListError;
use crate::{
    Result,
    constants::ID_FIELD,
    document::{Document, RecordId},
    scope::ScopeKey,
    store::{DocumentStore, Filter},
};

/// Reads the position stored in `field`. `null` and missing mean "not in list".
///
/// # Errors
/// `ListError::InvalidPosition` when the field holds anything but an integer or `null`.
pub fn read_position(doc: &Document, field: &str) -> Result<Option<i64>> {
    match doc.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or_else(|| {
            ListError::InvalidPosition {
                field: field.to_string(),
                value: value.to_string(),
            }
            .into()
        }),
    }
}

/// Writes a position into `field`, `None` as `null`.
pub fn write_position(doc: &mut Document, field: &str, position: Option<i64>) {
    doc.insert(field.to_string(), position.map_or(Value::Null, Value::from));
}

pub(crate) struct Positions<'a> {
    store: &'a dyn DocumentStore,
    collection: &'a str,
    field: &'a str,
}

impl<'a> Positions<'a> {
    pub(crate) fn new(store: &'a dyn DocumentStore, collection: &'a str, field: &'a str) -> Self {
        Self {
            store,
            collection,
            field,
        }
    }

    pub(crate) fn read(&self, doc: &Document) -> Result<Option<i64>> {
        read_position(doc, self.field)
    }

    /// Filter for the listed members of a scope, optionally without one record.
    fn listed(&self, scope: &ScopeKey, except: Option<&RecordId>) -> Filter {
        let filter = scope.filter().not_null(self.field);
        match except {
            Some(id) => filter.ne(ID_FIELD, id.as_str()),
            None => filter,
        }
    }

    /// Number of listed members of a scope.
    pub(crate) async fn count(&self, scope: &ScopeKey, except: Option<&RecordId>) -> Result<i64> {
        let count = self
            .store
            .count(self.collection, &self.listed(scope, except))
            .await?;
        Ok(count as i64)
    }

    /// Highest position in a scope, 0 when nothing is listed.
    pub(crate) async fn bottom(&self, scope: &ScopeKey, except: Option<&RecordId>) -> Result<i64> {
        let items = self
            .store
            .find(self.collection, &self.listed(scope, except), None)
            .await?;
        let mut bottom = 0;
        for doc in &items {
            if let Some(position) = self.read(doc)? {
                bottom = bottom.max(position);
            }
        }
        Ok(bottom)
    }

    /// The position just below the bottom of a scope.
    ///
    /// # Errors
    /// `ListError::InvalidPosition` when the bottom position is `i64::MAX`.
    pub(crate) async fn after_bottom(
        &self,
        scope: &ScopeKey,
        except: Option<&RecordId>,
    ) -> Result<i64> {
        let bottom = self.bottom(scope, except).await?;
        bottom.checked_add(1).ok_or_else(|| {
            ListError::InvalidPosition {
                field: self.field.to_string(),
                value: bottom.to_string(),
            }
            .into()
        })
    }

    pub(crate) async fn item_at(&self, scope: &ScopeKey, position: i64) -> Result<Option<Document>> {
        let filter = self
            .listed(scope, None)
            .range(self.field, Some(position), Some(position));
        Ok(self
            .store
            .find(self.collection, &filter, None)
            .await?
            .into_iter()
            .next())
    }

    /// Listed members of a scope ordered by position.
    pub(crate) async fn items(&self, scope: &ScopeKey) -> Result<Vec<Document>> {
        self.store
            .find(self.collection, &self.listed(scope, None), Some(self.field))
            .await
    }

    /// Adds `delta` to every listed position of the scope within `min..=max`.
    pub(crate) async fn shift(
        &self,
        scope: &ScopeKey,
        min: Option<i64>,
        max: Option<i64>,
        delta: i64,
        except: Option<&RecordId>,
    ) -> Result<usize> {
        if let (Some(min), Some(max)) = (min, max)
            && min > max
        {
            return Ok(0);
        }
        let filter = self.listed(scope, except).range(self.field, min, max);
        let changed = self
            .store
            .shift(self.collection, &filter, self.field, delta)
            .await?;
        debug!(
            collection = self.collection,
            scope = %scope,
            min = ?min,
            max = ?max,
            delta,
            changed,
            "Shifted sibling positions"
        );
        Ok(changed)
    }

    /// Moves every sibling below `position` up by one.
    pub(crate) async fn close_gap(
        &self,
        scope: &ScopeKey,
        position: i64,
        except: Option<&RecordId>,
    ) -> Result<usize> {
        match position.checked_add(1) {
            Some(below) => self.shift(scope, Some(below), None, -1, except).await,
            None => Ok(0),
        }
    }

    pub(crate) async fn set(&self, id: &RecordId, position: Option<i64>) -> Result<()> {
        self.store
            .set_field(
                self.collection,
                id,
                self.field,
                position.map_or(Value::Null, Value::from),
            )
            .await?;
        debug!(collection = self.collection, id = %id, position = ?position, "Set position");
        Ok(())
    }
}
