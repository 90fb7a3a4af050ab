//! The list engine.
//!
//! A [`List`] keeps the position field of a collection dense within every scope: the
//! listed members of a scope always hold exactly the positions `1..=N`, with no gaps and no
//! duplicates, between completed operations.
//!
//! Each mutating operation locks the record's scope, re-reads the record, shifts the
//! affected siblings with range-guarded delta updates and only then writes the record's own
//! position. Operations on different scopes run independently.
//!
//! Positions are 1-based. The "higher" item of a record is the one at `position - 1`
//! (closer to the top), the "lower" item the one at `position + 1`.
//!
//! # Destroying a record
//!
//! Destroying a listed record closes the gap it leaves. Destroying a record that was
//! already taken out with [`List::remove_from_list`] must not shift its former siblings
//! a second time: the gap was closed when it was removed. The decision is made solely on
//! whether the record still holds a position at the moment it is destroyed.

mod errors;
mod locks;
mod positions;


pub use errors::ListError;
pub use locks::ScopeGuard;
pub use positions::{read_position, write_position};

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use tracing::{debug, info, trace, warn};

use crate::{
    Model, Result,
    config::{ConfigError, ListConfig},
    constants::TOP_POSITION,
    document::{Document, RecordId, record_id},
    lifecycle::Lifecycle,
    scope::{ScopeKey, ScopeResolver},
    store::DocumentStore,
};
use locks::ScopeLocks;
use positions::Positions;

/// Ordered-position maintenance for one collection.
///
/// `List` is a cheap, clonable handle. Clones share the same scope locks, so every writer
/// of a collection should go through clones of one `List`. Record types sharing a
/// collection share its `List` (see [`List::validate_model`]).
#[derive(Clone)]
pub struct List {
    inner: Arc<ListInner>,
}

struct ListInner {
    store: Arc<dyn DocumentStore>,
    collection: String,
    config: Arc<ListConfig>,
    resolver: ScopeResolver,
    locks: ScopeLocks,
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("collection", &self.inner.collection)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// A record re-read while its scope is locked.
struct Locked {
    scope: ScopeKey,
    position: Option<i64>,
    _guard: ScopeGuard,
}

impl List {
    /// Creates the list of a record type, validating the configuration against it.
    ///
    /// # Errors
    /// A `ConfigError` if the position or a scope field is not a key of `M`.
    pub fn for_model<M: Model>(
        store: Arc<dyn DocumentStore>,
        config: Arc<ListConfig>,
    ) -> Result<Self> {
        config.validate::<M>()?;
        debug!(
            collection = M::COLLECTION,
            position_field = %config.position_field,
            scope = ?config.scope,
            "Configured list"
        );
        Ok(Self {
            inner: Arc::new(ListInner {
                store,
                collection: M::COLLECTION.to_string(),
                resolver: ScopeResolver::new(&config),
                config,
                locks: ScopeLocks::default(),
            }),
        })
    }

    /// Checks that another record type can share this list.
    ///
    /// # Errors
    /// `ConfigError::CollectionMismatch` if `M` lives in another collection, or any
    /// validation error of the configuration against `M`.
    pub fn validate_model<M: Model>(&self) -> Result<()> {
        if M::COLLECTION != self.inner.collection {
            return Err(ConfigError::CollectionMismatch {
                model: M::COLLECTION.to_string(),
                list: self.inner.collection.clone(),
            }
            .into());
        }
        self.inner.config.validate::<M>()?;
        Ok(())
    }

    pub fn collection(&self) -> &str {
        &self.inner.collection
    }

    pub fn config(&self) -> &Arc<ListConfig> {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.inner.store
    }

    /// Scope key of a document, from its current field values.
    pub fn scope_of(&self, doc: &Document) -> ScopeKey {
        self.inner.resolver.resolve(doc)
    }

    fn positions(&self) -> Positions<'_> {
        Positions::new(
            self.inner.store.as_ref(),
            &self.inner.collection,
            &self.inner.config.position_field,
        )
    }

    fn id_of(&self, doc: &Document) -> Result<RecordId> {
        record_id(doc).ok_or_else(|| {
            ListError::MissingRecordId {
                collection: self.inner.collection.clone(),
            }
            .into()
        })
    }

    async fn load(&self, id: &RecordId) -> Result<Document> {
        self.inner
            .store
            .get(&self.inner.collection, id)
            .await?
            .ok_or_else(|| {
                ListError::NotInStore {
                    collection: self.inner.collection.clone(),
                    id: id.to_string(),
                }
                .into()
            })
    }

    async fn lock(&self, scope: &ScopeKey) -> ScopeGuard {
        let guard = self.inner.locks.acquire(scope.fingerprint()).await;
        trace!(collection = %self.inner.collection, scope = %scope, "Acquired scope lock");
        guard
    }

    /// Loads a record and locks its scope, then re-reads it under the lock.
    ///
    /// A record that changed scope before the lock was taken is locked again on its new
    /// scope.
    async fn lock_record(&self, id: &RecordId) -> Result<Locked> {
        let mut scope = self.scope_of(&self.load(id).await?);
        loop {
            let guard = self.lock(&scope).await;
            let doc = self.load(id).await?;
            let current = self.scope_of(&doc);
            if current == scope {
                return Ok(Locked {
                    scope,
                    position: self.positions().read(&doc)?,
                    _guard: guard,
                });
            }
            trace!(
                collection = %self.inner.collection,
                id = %id,
                from = %scope,
                to = %current,
                "Record changed scope while locking, retrying"
            );
            scope = current;
        }
    }

    /// Moves a record to `position` within its scope and returns the position it landed on.
    ///
    /// Out-of-range targets are clamped to `1..=N+1`, N being the number of listed
    /// siblings. A record that is not in the list yet is inserted, pushing everything at or
    /// below the target down by one.
    pub async fn insert_at(&self, id: &RecordId, position: i64) -> Result<i64> {
        let record = self.lock_record(id).await?;
        self.insert_at_locked(Some(id), record.position, &record.scope, position)
            .await
    }

    pub async fn move_to_top(&self, id: &RecordId) -> Result<i64> {
        self.insert_at(id, TOP_POSITION).await
    }

    pub async fn move_to_bottom(&self, id: &RecordId) -> Result<i64> {
        self.insert_at(id, i64::MAX).await
    }

    /// Swaps a record with the one above it. Returns `false` when nothing moved.
    pub async fn move_higher(&self, id: &RecordId) -> Result<bool> {
        let record = self.lock_record(id).await?;
        match record.position {
            Some(position) if position > TOP_POSITION => {
                self.swap(id, position, position - 1, &record.scope).await
            }
            _ => Ok(false),
        }
    }

    /// Swaps a record with the one below it. Returns `false` when nothing moved.
    pub async fn move_lower(&self, id: &RecordId) -> Result<bool> {
        let record = self.lock_record(id).await?;
        match record.position {
            Some(position) => match position.checked_add(1) {
                Some(below) => self.swap(id, position, below, &record.scope).await,
                None => Ok(false),
            },
            None => Ok(false),
        }
    }

    /// Takes a record out of its list without deleting it, closing the gap it leaves.
    ///
    /// Idempotent: returns `false` and changes nothing if the record is not in the list.
    pub async fn remove_from_list(&self, id: &RecordId) -> Result<bool> {
        let record = self.lock_record(id).await?;
        let Some(position) = record.position else {
            debug!(collection = %self.inner.collection, id = %id, "Record not in list, nothing to remove");
            return Ok(false);
        };
        let positions = self.positions();
        positions.close_gap(&record.scope, position, Some(id)).await?;
        positions.set(id, None).await?;
        Ok(true)
    }

    /// Puts a removed record back at the bottom of its list. Listed records stay put.
    pub async fn add_to_list_bottom(&self, id: &RecordId) -> Result<i64> {
        let record = self.lock_record(id).await?;
        if let Some(position) = record.position {
            return Ok(position);
        }
        let positions = self.positions();
        let position = positions.after_bottom(&record.scope, Some(id)).await?;
        positions.set(id, Some(position)).await?;
        Ok(position)
    }

    /// Deletes a record from the store and closes the gap it leaves, if it left one.
    ///
    /// Returns `false` if the record did not exist.
    pub async fn destroy(&self, id: &RecordId) -> Result<bool> {
        let store = &self.inner.store;
        let collection = &self.inner.collection;
        let Some(mut doc) = store.get(collection, id).await? else {
            return Ok(false);
        };
        loop {
            let scope = self.scope_of(&doc);
            let _guard = self.lock(&scope).await;

            let Some(current) = store.get(collection, id).await? else {
                return Ok(false);
            };
            if self.scope_of(&current) == scope {
                store.remove(collection, id).await?;
                self.close_gap(&current, &scope).await?;
                return Ok(true);
            }
            doc = current;
        }
    }

    /// Current position of a record, `None` when it is not in the list.
    pub async fn position(&self, id: &RecordId) -> Result<Option<i64>> {
        self.positions().read(&self.load(id).await?)
    }

    pub async fn in_list(&self, id: &RecordId) -> Result<bool> {
        Ok(self.position(id).await?.is_some())
    }

    pub async fn is_first(&self, id: &RecordId) -> Result<bool> {
        Ok(self.position(id).await? == Some(TOP_POSITION))
    }

    pub async fn is_last(&self, id: &RecordId) -> Result<bool> {
        let doc = self.load(id).await?;
        let positions = self.positions();
        let Some(position) = positions.read(&doc)? else {
            return Ok(false);
        };
        Ok(position == positions.bottom(&self.scope_of(&doc), None).await?)
    }

    /// The sibling directly above a record, if any.
    pub async fn higher_item(&self, id: &RecordId) -> Result<Option<Document>> {
        self.neighbour(id, -1).await
    }

    /// The sibling directly below a record, if any.
    pub async fn lower_item(&self, id: &RecordId) -> Result<Option<Document>> {
        self.neighbour(id, 1).await
    }

    /// Listed members of a scope in position order.
    pub async fn items(&self, scope: &ScopeKey) -> Result<Vec<Document>> {
        self.positions().items(scope).await
    }

    /// Verifies that the positions of a scope are exactly `1..=N`.
    ///
    /// # Errors
    /// `ListError::InvariantViolation` carrying the positions found, in order.
    pub async fn check(&self, scope: &ScopeKey) -> Result<()> {
        let positions = self.positions();
        let mut found = Vec::new();
        for doc in positions.items(scope).await? {
            if let Some(position) = positions.read(&doc)? {
                found.push(position);
            }
        }
        if found.iter().copied().eq(TOP_POSITION..TOP_POSITION + found.len() as i64) {
            return Ok(());
        }
        warn!(
            collection = %self.inner.collection,
            scope = %scope,
            positions = ?found,
            "List positions are not dense"
        );
        Err(ListError::InvariantViolation {
            scope: scope.to_string(),
            positions: found,
        }
        .into())
    }

    /// Renumbers a scope to `1..=N`, keeping the current order. Returns the number of
    /// records whose position changed.
    ///
    /// Only needed to repair data written outside the list engine.
    pub async fn compact(&self, scope: &ScopeKey) -> Result<usize> {
        let _guard = self.lock(scope).await;
        let positions = self.positions();
        let mut changed = 0;
        for (doc, expected) in positions.items(scope).await?.iter().zip(TOP_POSITION..) {
            if positions.read(doc)? != Some(expected) {
                positions.set(&self.id_of(doc)?, Some(expected)).await?;
                changed += 1;
            }
        }
        if changed > 0 {
            info!(
                collection = %self.inner.collection,
                scope = %scope,
                changed,
                "Compacted list positions"
            );
        }
        Ok(changed)
    }

    async fn neighbour(&self, id: &RecordId, offset: i64) -> Result<Option<Document>> {
        let doc = self.load(id).await?;
        match self
            .positions()
            .read(&doc)?
            .and_then(|position| position.checked_add(offset))
        {
            Some(target) if target >= TOP_POSITION => {
                self.positions().item_at(&self.scope_of(&doc), target).await
            }
            _ => Ok(None),
        }
    }

    async fn swap(&self, id: &RecordId, from: i64, to: i64, scope: &ScopeKey) -> Result<bool> {
        let positions = self.positions();
        let Some(neighbour) = positions.item_at(scope, to).await? else {
            return Ok(false);
        };
        positions.set(&self.id_of(&neighbour)?, Some(from)).await?;
        positions.set(id, Some(to)).await?;
        Ok(true)
    }

    /// Core of `insert_at`, run with the scope locked. `id` is `None` for a record that is
    /// not stored yet; its own position is then left to the caller.
    async fn insert_at_locked(
        &self,
        id: Option<&RecordId>,
        current: Option<i64>,
        scope: &ScopeKey,
        requested: i64,
    ) -> Result<i64> {
        let positions = self.positions();
        let siblings = positions.count(scope, id).await?;
        let target = requested.clamp(TOP_POSITION, siblings + 1);

        match current {
            Some(position) if position == target => return Ok(target),
            Some(position) if target < position => {
                positions
                    .shift(scope, Some(target), Some(position - 1), 1, id)
                    .await?
            }
            Some(position) => {
                positions
                    .shift(scope, Some(position + 1), Some(target), -1, id)
                    .await?
            }
            None => positions.shift(scope, Some(target), None, 1, id).await?,
        };

        if let Some(id) = id {
            positions.set(id, Some(target)).await?;
        }
        Ok(target)
    }

    /// Closes the gap left by a destroyed record. A record that no longer held a position
    /// left no gap.
    async fn close_gap(&self, doc: &Document, scope: &ScopeKey) -> Result<()> {
        let positions = self.positions();
        match positions.read(doc)? {
            Some(position) => {
                positions
                    .close_gap(scope, position, record_id(doc).as_ref())
                    .await?;
            }
            None => {
                debug!(
                    collection = %self.inner.collection,
                    scope = %scope,
                    "Destroyed record was not in list, siblings unchanged"
                );
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Lifecycle for List {
    async fn scope_guards(&self, docs: &[&Document]) -> Result<Vec<ScopeGuard>> {
        let fingerprints = docs
            .iter()
            .map(|doc| self.scope_of(doc).fingerprint())
            .collect();
        Ok(self.inner.locks.acquire_all(fingerprints).await)
    }

    /// Appends the new record to the bottom of its list, or inserts it at the position it
    /// already carries.
    async fn before_create(&self, doc: &mut Document) -> Result<()> {
        let scope = self.scope_of(doc);
        let positions = self.positions();
        let position = match positions.read(doc)? {
            Some(requested) => self.insert_at_locked(None, None, &scope, requested).await?,
            None => positions.after_bottom(&scope, None).await?,
        };
        write_position(doc, &self.inner.config.position_field, Some(position));
        debug!(
            collection = %self.inner.collection,
            scope = %scope,
            position,
            "Positioned new record"
        );
        Ok(())
    }

    /// Keeps the stored position; a record that changed scope joins the bottom of its new
    /// list. The gap in the old list is closed by `after_update`, once the record is written.
    async fn before_update(&self, stored: &Document, doc: &mut Document) -> Result<()> {
        let positions = self.positions();
        let stored_position = positions.read(stored)?;
        let old_scope = self.scope_of(stored);
        let new_scope = self.scope_of(doc);

        let position = if old_scope == new_scope || stored_position.is_none() {
            stored_position
        } else {
            let position = positions
                .after_bottom(&new_scope, record_id(stored).as_ref())
                .await?;
            debug!(
                collection = %self.inner.collection,
                from = %old_scope,
                to = %new_scope,
                position,
                "Record changed scope"
            );
            Some(position)
        };
        write_position(doc, &self.inner.config.position_field, position);
        Ok(())
    }

    /// Closes the gap a record left in its old list when it changed scope.
    async fn after_update(&self, stored: &Document, doc: &Document) -> Result<()> {
        let old_scope = self.scope_of(stored);
        if old_scope == self.scope_of(doc) {
            return Ok(());
        }
        self.close_gap(stored, &old_scope).await
    }

    async fn after_destroy(&self, doc: &Document) -> Result<()> {
        self.close_gap(doc, &self.scope_of(doc)).await
    }
}
