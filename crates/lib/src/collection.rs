use std::{marker::PhantomData, sync::Arc};

use tracing::debug;

use crate::{
    List, Result,
    constants::TYPE_FIELD,
    dirty::ChangeSet,
    document::{Document, Model, RecordId, record_id, set_record_id},
    lifecycle::Lifecycle,
    store::{DocumentStore, Filter, StoreError},
};

/// A typed, record-oriented view over one store collection.
///
/// `Collection` serializes records of type `M` to documents and runs the registered
/// [`Lifecycle`] hooks around every write. Attaching a [`List`] with
/// [`Collection::with_list`] is what keeps the collection's positions dense.
///
/// # Features
/// - Scope guards are held across the hook calls and the store write of each operation
/// - `before_create` runs before insertion, `after_destroy` after deletion
/// - Inheritance-aware types (`M::TYPE_NAME`) only see their own records in `all`,
///   `find` and `search`
///
/// # Example
///
/// ```
/// # use std::sync::Arc;
/// # use listkeeper::{Collection, InMemory, List, ListConfig, Model};
/// # use serde::{Deserialize, Serialize};
/// #[derive(Clone, Serialize, Deserialize)]
/// struct Task {
///     title: String,
///     project: String,
///     position: Option<i64>,
/// }
///
/// impl Model for Task {
///     const COLLECTION: &'static str = "tasks";
///     const KEYS: &'static [&'static str] = &["title", "project", "position"];
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> listkeeper::Result<()> {
/// let store = Arc::new(InMemory::new());
/// let list = List::for_model::<Task>(store.clone(), Arc::new(ListConfig::new().scope("project")))?;
/// let tasks = Collection::<Task>::new(store).with_list(&list)?;
///
/// let first = tasks.insert(&Task { title: "a".into(), project: "p".into(), position: None }).await?;
/// let second = tasks.insert(&Task { title: "b".into(), project: "p".into(), position: None }).await?;
/// list.move_to_top(&second).await?;
/// assert_eq!(list.position(&first).await?, Some(2));
/// # Ok(())
/// # }
/// ```
pub struct Collection<M: Model> {
    store: Arc<dyn DocumentStore>,
    hooks: Vec<Arc<dyn Lifecycle>>,
    phantom: PhantomData<M>,
}

impl<M: Model> Clone for Collection<M> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            hooks: self.hooks.clone(),
            phantom: PhantomData,
        }
    }
}

impl<M: Model> std::fmt::Debug for Collection<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("collection", &M::COLLECTION)
            .field("hooks", &self.hooks.len())
            .finish_non_exhaustive()
    }
}

impl<M: Model> Collection<M> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            hooks: Vec::new(),
            phantom: PhantomData,
        }
    }

    /// Registers a list as a lifecycle hook after checking that `M` can use it.
    ///
    /// # Errors
    /// A `ConfigError` if the list belongs to another collection or its configuration does
    /// not fit `M`.
    pub fn with_list(self, list: &List) -> Result<Self> {
        list.validate_model::<M>()?;
        Ok(self.with_hook(Arc::new(list.clone())))
    }

    pub fn with_hook(mut self, hook: Arc<dyn Lifecycle>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn name(&self) -> &'static str {
        M::COLLECTION
    }

    /// Inserts a new record and returns its generated id.
    ///
    /// A record serializing an explicit position is inserted there when a list is
    /// attached; otherwise it is appended to the bottom of its list.
    pub async fn insert(&self, row: &M) -> Result<RecordId> {
        self.insert_document(row.to_document()?).await
    }

    /// Inserts a raw document through the lifecycle hooks.
    pub async fn insert_document(&self, mut doc: Document) -> Result<RecordId> {
        let _guards = self.guards(&[&doc]).await?;
        for hook in &self.hooks {
            hook.before_create(&mut doc).await?;
        }
        let id = self.store.insert(M::COLLECTION, doc).await?;
        debug!(collection = M::COLLECTION, id = %id, "Inserted record");
        Ok(id)
    }

    /// Retrieves a record by id.
    ///
    /// # Errors
    /// `StoreError::RecordNotFound` if no record exists with the given id.
    pub async fn get(&self, id: &RecordId) -> Result<M> {
        M::from_document(&self.get_document(id).await?)
    }

    /// Retrieves the stored document of a record, reserved fields included.
    pub async fn get_document(&self, id: &RecordId) -> Result<Document> {
        self.store
            .get(M::COLLECTION, id)
            .await?
            .ok_or_else(|| self.not_found(id))
    }

    /// Replaces a record with a new value.
    ///
    /// Hooks decide what survives the replacement; an attached list keeps the stored
    /// position. Returns `false` when nothing changed and no write was made.
    pub async fn update(&self, id: &RecordId, row: &M) -> Result<bool> {
        let mut doc = row.to_document()?;
        set_record_id(&mut doc, id);

        let mut current = self.get_document(id).await?;
        let (_guards, stored) = loop {
            let guards = self.guards(&[&current, &doc]).await?;
            let stored = self.get_document(id).await?;
            if stored == current {
                break (guards, stored);
            }
            // Changed before the guards were taken; they may cover the wrong scopes.
            current = stored;
        };
        for hook in &self.hooks {
            hook.before_update(&stored, &mut doc).await?;
        }

        let changes = ChangeSet::diff(&stored, &doc);
        if !changes.has_changes(&doc) {
            return Ok(false);
        }
        debug!(
            collection = M::COLLECTION,
            id = %id,
            changed = ?changes.changed(&doc),
            "Updating record"
        );
        self.store.replace(M::COLLECTION, id, doc.clone()).await?;
        for hook in &self.hooks {
            hook.after_update(&stored, &doc).await?;
        }
        Ok(true)
    }

    /// Deletes a record, then runs `after_destroy` with its last stored state.
    ///
    /// Returns `false` if no record existed with the given id.
    pub async fn delete(&self, id: &RecordId) -> Result<bool> {
        let Some(mut current) = self.store.get(M::COLLECTION, id).await? else {
            return Ok(false);
        };
        // Re-read under the guards so the hooks see the state actually destroyed.
        let (_guards, doc) = loop {
            let guards = self.guards(&[&current]).await?;
            let Some(doc) = self.store.get(M::COLLECTION, id).await? else {
                return Ok(false);
            };
            if doc == current {
                break (guards, doc);
            }
            current = doc;
        };
        self.store.remove(M::COLLECTION, id).await?;
        for hook in &self.hooks {
            hook.after_destroy(&doc).await?;
        }
        debug!(collection = M::COLLECTION, id = %id, "Deleted record");
        Ok(true)
    }

    /// All records of this type, ordered by id.
    pub async fn all(&self) -> Result<Vec<(RecordId, M)>> {
        self.find(&Filter::new(), None).await
    }

    /// Records matching a filter, optionally sorted by an integer field.
    pub async fn find(
        &self,
        filter: &Filter,
        sort_by: Option<&str>,
    ) -> Result<Vec<(RecordId, M)>> {
        let filter = match M::TYPE_NAME {
            Some(type_name) => filter.clone().eq(TYPE_FIELD, type_name),
            None => filter.clone(),
        };
        self.store
            .find(M::COLLECTION, &filter, sort_by)
            .await?
            .iter()
            .map(|doc| -> Result<(RecordId, M)> {
                let id = record_id(doc).ok_or_else(|| StoreError::DeserializationFailed {
                    collection: M::COLLECTION.to_string(),
                    reason: "stored document has no record id".to_string(),
                })?;
                Ok((id, M::from_document(doc)?))
            })
            .collect()
    }

    /// Searches for records matching a predicate.
    pub async fn search(&self, query: impl Fn(&M) -> bool) -> Result<Vec<(RecordId, M)>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|(_, row)| query(row))
            .collect())
    }

    async fn guards(&self, docs: &[&Document]) -> Result<Vec<crate::ScopeGuard>> {
        let mut guards = Vec::new();
        for hook in &self.hooks {
            guards.extend(hook.scope_guards(docs).await?);
        }
        Ok(guards)
    }

    fn not_found(&self, id: &RecordId) -> crate::Error {
        StoreError::RecordNotFound {
            collection: M::COLLECTION.to_string(),
            id: id.to_string(),
        }
        .into()
    }
}
