//! Opening the item store and wiring the list onto it.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use listkeeper::{Collection, DocumentStore, InMemory, List, ListConfig, Model, ScopeKey};
use serde::{Deserialize, Serialize};

/// An item kept in one of the named lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub list: String,
    pub position: Option<i64>,
}

impl Model for Item {
    const COLLECTION: &'static str = "items";
    const KEYS: &'static [&'static str] = &["name", "list", "position"];
}

/// The loaded data file with the list engine attached.
pub struct Workspace {
    path: PathBuf,
    store: Arc<InMemory>,
    pub list: List,
    pub items: Collection<Item>,
}

impl Workspace {
    /// Loads the data file, starting empty if it does not exist yet.
    pub async fn open(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let store = Arc::new(InMemory::load_from_file(path).await?);
        tracing::debug!("Opened {}", path.display());

        let shared: Arc<dyn DocumentStore> = store.clone();
        let config = Arc::new(ListConfig::new().scope("list"));
        let list = List::for_model::<Item>(shared.clone(), config)?;
        let items = Collection::new(shared).with_list(&list)?;
        Ok(Self {
            path: path.to_path_buf(),
            store,
            list,
            items,
        })
    }

    pub async fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.store.save_to_file(&self.path).await?;
        Ok(())
    }
}

/// Scope key of a named list.
pub fn list_scope(name: &str) -> ScopeKey {
    [("list", name)].into_iter().collect()
}
