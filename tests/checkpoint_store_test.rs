//! Checkpoint store behavior under realistic use

use std::sync::Arc;

use graphflow::checkpoint::{Checkpoint, Checkpointer, MemoryCheckpointer};
use graphflow::graph::InterruptPhase;
use graphflow::state::{GraphState, StateData};
use serde_json::json;

fn snapshot_with(key: &str, value: serde_json::Value) -> GraphState {
    let mut state = GraphState::new();
    let mut update = StateData::new();
    update.insert(key.to_string(), value);
    state.merge("writer", Some(update));
    state
}

#[tokio::test]
async fn get_on_unsaved_pair_returns_none() {
    let store = MemoryCheckpointer::new();
    assert!(store.get("ghost-thread", "ghost-cp").await.unwrap().is_none());

    // a saved thread still answers None for an unknown checkpoint id
    let state = snapshot_with("k", json!(1));
    store
        .save(Checkpoint::capture("t", "c1", &state, "n", InterruptPhase::After))
        .await
        .unwrap();
    assert!(store.get("t", "c2").await.unwrap().is_none());
}

#[tokio::test]
async fn save_then_get_is_structurally_equal() {
    let store = MemoryCheckpointer::new();
    let state = snapshot_with("nested", json!({"a": [1, 2, {"b": "deep"}]}));

    store
        .save(Checkpoint::capture("t", "c", &state, "n", InterruptPhase::Before))
        .await
        .unwrap();

    let loaded = store.get("t", "c").await.unwrap().unwrap();
    assert_eq!(loaded.state, state.snapshot());
    assert_eq!(loaded.history.len(), state.history().len());
    assert_eq!(loaded.history[0].node, "writer");
}

#[tokio::test]
async fn concurrent_threads_do_not_cross_contaminate() {
    let store = Arc::new(MemoryCheckpointer::new());

    let mut handles = Vec::new();
    for t in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let thread_id = format!("thread-{t}");
            for c in 0..5 {
                let state = snapshot_with("owner", json!(thread_id.clone()));
                let cp = Checkpoint::capture(
                    &thread_id,
                    format!("cp-{c}"),
                    &state,
                    "n",
                    InterruptPhase::After,
                );
                store.save(cp).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for t in 0..8 {
        let thread_id = format!("thread-{t}");
        let ids = store.list(&thread_id).await.unwrap();
        assert_eq!(ids, vec!["cp-0", "cp-1", "cp-2", "cp-3", "cp-4"]);
        for id in ids {
            let cp = store.get(&thread_id, &id).await.unwrap().unwrap();
            assert_eq!(cp.state.get("owner"), Some(&json!(thread_id.clone())));
        }
    }
}

#[tokio::test]
async fn overwrite_keeps_id_position_in_list() {
    let store = MemoryCheckpointer::new();
    for id in ["c1", "c2", "c3"] {
        let state = snapshot_with("v", json!(id));
        store
            .save(Checkpoint::capture("t", id, &state, "n", InterruptPhase::After))
            .await
            .unwrap();
    }

    // overwriting c1 neither errors nor moves it to the end
    let state = snapshot_with("v", json!("c1-replaced"));
    store
        .save(Checkpoint::capture("t", "c1", &state, "n", InterruptPhase::After))
        .await
        .unwrap();

    assert_eq!(store.list("t").await.unwrap(), vec!["c1", "c2", "c3"]);
    let cp = store.get("t", "c1").await.unwrap().unwrap();
    assert_eq!(cp.state.get("v"), Some(&json!("c1-replaced")));
}
