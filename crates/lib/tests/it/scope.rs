use listkeeper::{DocumentStore, ScopeKey};
use serde_json::Value;

use crate::helpers::*;

#[tokio::test]
async fn test_null_scope_is_its_own_list() {
    let (list, tasks) = task_fixture();
    let loose_a = tasks.insert(&Task::unassigned("loose a")).await.unwrap();
    let assigned = tasks.insert(&Task::new("assigned", "p")).await.unwrap();
    let loose_b = tasks.insert(&Task::unassigned("loose b")).await.unwrap();

    assert_eq!(
        positions(&list, &[loose_a.clone(), assigned, loose_b.clone()]).await,
        [Some(1), Some(1), Some(2)]
    );

    let null_scope: ScopeKey = [("project", Value::Null)].into_iter().collect();
    let doc = tasks.get_document(&loose_a).await.unwrap();
    assert_eq!(list.scope_of(&doc), null_scope);

    list.move_to_top(&loose_b).await.unwrap();
    let titles: Vec<_> = list
        .items(&null_scope)
        .await
        .unwrap()
        .iter()
        .map(|doc| field(doc, "title").to_string())
        .collect();
    assert_eq!(titles, ["loose b", "loose a"]);
    assert_dense(&list, &null_scope).await;
}

#[tokio::test]
async fn test_scope_key_reflects_current_values() {
    let (list, tasks) = task_fixture();
    let id = tasks.insert(&Task::new("A", "p")).await.unwrap();

    let mut moved = tasks.get(&id).await.unwrap();
    moved.project = None;
    tasks.update(&id, &moved).await.unwrap();

    let doc = tasks.get_document(&id).await.unwrap();
    assert_eq!(
        list.scope_of(&doc),
        [("project", Value::Null)].into_iter().collect::<ScopeKey>()
    );
    assert!(list.is_first(&id).await.unwrap());
    assert!(list.is_last(&id).await.unwrap());
}

#[tokio::test]
async fn test_check_and_compact_repair_foreign_writes() {
    let (list, tasks) = task_fixture();
    let ids = insert_tasks(&tasks, "p", &["A", "B", "C"]).await;

    // Simulate a writer that bypasses the list engine.
    list.store()
        .set_field("tasks", &ids[1], "position", Value::from(7))
        .await
        .unwrap();

    let err = list.check(&project_scope("p")).await.unwrap_err();
    assert!(err.is_invariant_violation());

    assert_eq!(list.compact(&project_scope("p")).await.unwrap(), 2);
    assert_eq!(task_order(&list, "p").await, ["A", "C", "B"]);
    assert_dense(&list, &project_scope("p")).await;
}
