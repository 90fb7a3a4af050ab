use std::sync::Arc;

use listkeeper::{Collection, DocumentStore, InMemory, List, ListConfig};
use tempfile::tempdir;

use crate::helpers::*;

fn task_list(store: Arc<InMemory>) -> (List, Collection<Task>) {
    let store: Arc<dyn DocumentStore> = store;
    let list =
        List::for_model::<Task>(store.clone(), Arc::new(ListConfig::new().scope("project")))
            .unwrap();
    let tasks = Collection::new(store).with_list(&list).unwrap();
    (list, tasks)
}

#[tokio::test]
async fn test_positions_survive_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");

    let store = Arc::new(InMemory::new());
    let (list, tasks) = task_list(store.clone());
    let ids = insert_tasks(&tasks, "p", &["A", "B", "C"]).await;
    list.move_to_top(&ids[2]).await.unwrap();
    list.remove_from_list(&ids[1]).await.unwrap();
    store.save_to_file(&path).await.unwrap();

    let loaded = Arc::new(InMemory::load_from_file(&path).await.unwrap());
    assert_eq!(loaded.collection_names().await, ["tasks"]);
    let (list, tasks) = task_list(loaded);

    assert_eq!(task_order(&list, "p").await, ["C", "A"]);
    assert_eq!(list.position(&ids[1]).await.unwrap(), None);

    // Operations continue from the reloaded state.
    assert_eq!(list.add_to_list_bottom(&ids[1]).await.unwrap(), 3);
    let id = tasks.insert(&Task::new("D", "p").at(1)).await.unwrap();
    assert_eq!(list.position(&id).await.unwrap(), Some(1));
    assert_eq!(task_order(&list, "p").await, ["D", "C", "A", "B"]);
}

#[tokio::test]
async fn test_missing_file_loads_empty_store() {
    let dir = tempdir().unwrap();
    let store = InMemory::load_from_file(dir.path().join("absent.json"))
        .await
        .unwrap();
    assert!(store.collection_names().await.is_empty());
}
