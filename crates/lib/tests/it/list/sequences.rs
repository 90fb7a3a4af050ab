//! Pseudo-random operation sequences replayed against a `Vec` holding the expected order.

use listkeeper::{List, RecordId};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::helpers::*;

#[derive(Default)]
struct Expected {
    listed: Vec<RecordId>,
    unlisted: Vec<RecordId>,
}

impl Expected {
    fn all(&self) -> Vec<RecordId> {
        self.listed.iter().chain(&self.unlisted).cloned().collect()
    }

    fn index(&self, id: &RecordId) -> Option<usize> {
        self.listed.iter().position(|listed| listed == id)
    }

    fn take(&mut self, id: &RecordId) {
        self.listed.retain(|listed| listed != id);
        self.unlisted.retain(|unlisted| unlisted != id);
    }
}

async fn listed_ids(list: &List, project: &str) -> Vec<RecordId> {
    list.items(&project_scope(project))
        .await
        .unwrap()
        .iter()
        .map(|doc| listkeeper::document::record_id(doc).unwrap())
        .collect()
}

async fn run_sequence(seed: u64, steps: usize) {
    let (list, tasks) = task_fixture();
    let bystanders = insert_tasks(&tasks, "other", &["X", "Y"]).await;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut expected = Expected::default();

    for step in 0..steps {
        let all = expected.all();
        let op = if all.is_empty() { 0 } else { rng.gen_range(0..7) };
        let target = all.get(rng.gen_range(0..all.len().max(1))).cloned();

        match (op, target) {
            (0, _) => {
                let id = tasks
                    .insert(&Task::new(&format!("t{step}"), "p"))
                    .await
                    .unwrap();
                expected.listed.push(id);
            }
            (1, Some(id)) => {
                let requested = rng.gen_range(-2..expected.listed.len() as i64 + 4);
                expected.take(&id);
                let target = requested.clamp(1, expected.listed.len() as i64 + 1);
                expected.listed.insert(target as usize - 1, id.clone());
                assert_eq!(list.insert_at(&id, requested).await.unwrap(), target);
            }
            (2, Some(id)) => {
                let moved = list.move_higher(&id).await.unwrap();
                match expected.index(&id) {
                    Some(i) if i > 0 => {
                        assert!(moved);
                        expected.listed.swap(i, i - 1);
                    }
                    _ => assert!(!moved),
                }
            }
            (3, Some(id)) => {
                let moved = list.move_lower(&id).await.unwrap();
                match expected.index(&id) {
                    Some(i) if i + 1 < expected.listed.len() => {
                        assert!(moved);
                        expected.listed.swap(i, i + 1);
                    }
                    _ => assert!(!moved),
                }
            }
            (4, Some(id)) => {
                let was_listed = expected.index(&id).is_some();
                assert_eq!(list.remove_from_list(&id).await.unwrap(), was_listed);
                if was_listed {
                    expected.take(&id);
                    expected.unlisted.push(id);
                }
            }
            (5, Some(id)) => {
                if expected.index(&id).is_none() {
                    expected.take(&id);
                    expected.listed.push(id.clone());
                }
                let position = list.add_to_list_bottom(&id).await.unwrap();
                assert_eq!(Some(position as usize - 1), expected.index(&id));
            }
            (_, Some(id)) => {
                assert!(tasks.delete(&id).await.unwrap());
                expected.take(&id);
            }
            (_, None) => unreachable!("records exist once the first step ran"),
        }

        assert_eq!(
            listed_ids(&list, "p").await,
            expected.listed,
            "order diverged at step {step} (seed {seed})"
        );
        assert_dense(&list, &project_scope("p")).await;
    }

    for id in &expected.unlisted {
        assert_eq!(list.position(id).await.unwrap(), None);
    }
    assert_eq!(positions(&list, &bystanders).await, [Some(1), Some(2)]);
}

#[tokio::test]
async fn test_random_sequences_match_vec_model() {
    for seed in [1, 7, 42, 2024] {
        run_sequence(seed, 120).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_moves_keep_positions_dense() {
    let (list, tasks) = task_fixture();
    let ids = insert_tasks(&tasks, "p", &["A", "B", "C", "D", "E", "F"]).await;

    let mut handles = Vec::new();
    for worker in 0..8u64 {
        let list = list.clone();
        let tasks = tasks.clone();
        let ids = ids.clone();
        handles.push(tokio::spawn(async move {
            let mut rng = StdRng::seed_from_u64(worker);
            for step in 0..25 {
                let id = &ids[rng.gen_range(0..ids.len())];
                match rng.gen_range(0..4) {
                    0 => {
                        list.insert_at(id, rng.gen_range(0..8)).await.unwrap();
                    }
                    1 => {
                        list.move_lower(id).await.unwrap();
                    }
                    2 => {
                        list.move_higher(id).await.unwrap();
                    }
                    _ => {
                        tasks
                            .insert(&Task::new(&format!("w{worker}-{step}"), "p"))
                            .await
                            .unwrap();
                    }
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_dense(&list, &project_scope("p")).await;
    assert_eq!(task_order(&list, "p").await.len(), tasks.all().await.unwrap().len());
}
