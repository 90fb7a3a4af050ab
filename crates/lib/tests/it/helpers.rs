use std::{
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use listkeeper::{
    Collection, Document, DocumentStore, Filter, InMemory, List, ListConfig, Model, RecordId,
    ScopeKey, store::StoreError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

// ==========================
// TEST MODELS
// ==========================

/// A task ordered within its project. Tasks without a project form their own list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    pub project: Option<String>,
    pub position: Option<i64>,
}

impl Task {
    pub fn new(title: &str, project: &str) -> Self {
        Self {
            title: title.to_string(),
            project: Some(project.to_string()),
            position: None,
        }
    }

    pub fn unassigned(title: &str) -> Self {
        Self {
            title: title.to_string(),
            project: None,
            position: None,
        }
    }

    pub fn at(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }
}

impl Model for Task {
    const COLLECTION: &'static str = "tasks";
    const KEYS: &'static [&'static str] = &["title", "project", "position"];
}

/// A kanban card ranked within one column of one board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub title: String,
    pub board: u32,
    pub column: String,
    pub rank: Option<i64>,
}

impl Card {
    pub fn new(title: &str, board: u32, column: &str) -> Self {
        Self {
            title: title.to_string(),
            board,
            column: column.to_string(),
            rank: None,
        }
    }
}

impl Model for Card {
    const COLLECTION: &'static str = "cards";
    const KEYS: &'static [&'static str] = &["title", "board", "column", "rank"];
}

/// Media types sharing the `media` collection and its list configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub caption: String,
    pub album: String,
    pub position: Option<i64>,
}

impl Model for Image {
    const COLLECTION: &'static str = "media";
    const KEYS: &'static [&'static str] = &["caption", "album", "position"];
    const TYPE_NAME: Option<&'static str> = Some("Image");
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub caption: String,
    pub album: String,
    pub seconds: u32,
    pub position: Option<i64>,
}

impl Model for Video {
    const COLLECTION: &'static str = "media";
    const KEYS: &'static [&'static str] = &["caption", "album", "seconds", "position"];
    const TYPE_NAME: Option<&'static str> = Some("Video");
}

// ==========================
// INTERLEAVING STORE
// ==========================

type Action = Pin<Box<dyn Future<Output = ()> + Send>>;

/// An in-memory store that can run another operation in the middle of a read, or fail
/// its next replace.
#[derive(Default)]
pub struct InterleavingStore {
    inner: InMemory,
    on_next_get: Mutex<Option<Action>>,
    fail_next_replace: AtomicBool,
}

impl InterleavingStore {
    /// Runs `action` right after the next `get` has read its document, before that
    /// document is returned.
    pub async fn after_next_get(&self, action: impl Future<Output = ()> + Send + 'static) {
        *self.on_next_get.lock().await = Some(Box::pin(action));
    }

    pub fn fail_next_replace(&self) {
        self.fail_next_replace.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for InterleavingStore {
    async fn insert(&self, collection: &str, doc: Document) -> listkeeper::Result<RecordId> {
        self.inner.insert(collection, doc).await
    }

    async fn get(&self, collection: &str, id: &RecordId) -> listkeeper::Result<Option<Document>> {
        let doc = self.inner.get(collection, id).await?;
        let action = self.on_next_get.lock().await.take();
        if let Some(action) = action {
            action.await;
        }
        Ok(doc)
    }

    async fn replace(
        &self,
        collection: &str,
        id: &RecordId,
        doc: Document,
    ) -> listkeeper::Result<()> {
        if self.fail_next_replace.swap(false, Ordering::SeqCst) {
            return Err(StoreError::FileIo {
                source: std::io::Error::other("disk full"),
            }
            .into());
        }
        self.inner.replace(collection, id, doc).await
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort_by: Option<&str>,
    ) -> listkeeper::Result<Vec<Document>> {
        self.inner.find(collection, filter, sort_by).await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> listkeeper::Result<usize> {
        self.inner.count(collection, filter).await
    }

    async fn set_field(
        &self,
        collection: &str,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> listkeeper::Result<()> {
        self.inner.set_field(collection, id, field, value).await
    }

    async fn shift(
        &self,
        collection: &str,
        filter: &Filter,
        field: &str,
        delta: i64,
    ) -> listkeeper::Result<usize> {
        self.inner.shift(collection, filter, field, delta).await
    }

    async fn remove(&self, collection: &str, id: &RecordId) -> listkeeper::Result<bool> {
        self.inner.remove(collection, id).await
    }
}

// ==========================
// FACTORIES
// ==========================

/// Tasks scoped by project, over a fresh in-memory store.
pub fn task_fixture() -> (List, Collection<Task>) {
    let store: Arc<dyn DocumentStore> = Arc::new(InMemory::new());
    let list = List::for_model::<Task>(
        store.clone(),
        Arc::new(ListConfig::new().scope("project")),
    )
    .expect("Failed to configure task list");
    let tasks = Collection::new(store)
        .with_list(&list)
        .expect("Failed to attach task list");
    (list, tasks)
}

/// Tasks scoped by project, over an [`InterleavingStore`].
pub fn interleaving_task_fixture() -> (Arc<InterleavingStore>, List, Collection<Task>) {
    let store = Arc::new(InterleavingStore::default());
    let shared: Arc<dyn DocumentStore> = store.clone();
    let list = List::for_model::<Task>(
        shared.clone(),
        Arc::new(ListConfig::new().scope("project")),
    )
    .expect("Failed to configure task list");
    let tasks = Collection::new(shared)
        .with_list(&list)
        .expect("Failed to attach task list");
    (store, list, tasks)
}

/// Inserts one task per title into `project`, returning ids in insertion order.
pub async fn insert_tasks(tasks: &Collection<Task>, project: &str, titles: &[&str]) -> Vec<RecordId> {
    let mut ids = Vec::with_capacity(titles.len());
    for title in titles {
        ids.push(
            tasks
                .insert(&Task::new(title, project))
                .await
                .expect("Failed to insert task"),
        );
    }
    ids
}

// ==========================
// ASSERTIONS
// ==========================

pub fn project_scope(project: &str) -> ScopeKey {
    [("project", project)].into_iter().collect()
}

/// Titles of a project's listed tasks, top to bottom.
pub async fn task_order(list: &List, project: &str) -> Vec<String> {
    list.items(&project_scope(project))
        .await
        .expect("Failed to read list items")
        .iter()
        .map(|doc| doc["title"].as_str().unwrap_or_default().to_string())
        .collect()
}

/// Current positions of the given records.
pub async fn positions(list: &List, ids: &[RecordId]) -> Vec<Option<i64>> {
    let mut result = Vec::with_capacity(ids.len());
    for id in ids {
        result.push(list.position(id).await.expect("Failed to read position"));
    }
    result
}

/// Asserts that a scope holds exactly the positions 1..=N.
pub async fn assert_dense(list: &List, scope: &ScopeKey) {
    if let Err(e) = list.check(scope).await {
        panic!("scope {scope} is not dense: {e}");
    }
}

/// Reads a string field from a returned document.
pub fn field<'a>(doc: &'a Document, name: &str) -> &'a str {
    doc.get(name).and_then(Value::as_str).unwrap_or_default()
}
