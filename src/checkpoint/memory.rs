use async_trait::async_trait;
use dashmap::DashMap;
use indexmap::IndexMap;

use crate::checkpoint::{Checkpoint, CheckpointError, Checkpointer};

/// In-memory checkpoint storage.
///
/// Per-thread maps preserve save order for `list`; the outer map's sharding
/// keeps concurrent saves for distinct thread ids from contending.
#[derive(Default)]
pub struct MemoryCheckpointer {
    threads: DashMap<String, IndexMap<String, Checkpoint>>,
}

impl MemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of checkpoints stored for a thread.
    pub fn count(&self, thread_id: &str) -> usize {
        self.threads.get(thread_id).map_or(0, |m| m.len())
    }
}

#[async_trait]
impl Checkpointer for MemoryCheckpointer {
    async fn save(&self, checkpoint: Checkpoint) -> Result<(), CheckpointError> {
        self.threads
            .entry(checkpoint.thread_id.clone())
            .or_default()
            .insert(checkpoint.checkpoint_id.clone(), checkpoint);
        Ok(())
    }

    async fn get(
        &self,
        thread_id: &str,
        checkpoint_id: &str,
    ) -> Result<Option<Checkpoint>, CheckpointError> {
        Ok(self
            .threads
            .get(thread_id)
            .and_then(|m| m.get(checkpoint_id).cloned()))
    }

    async fn list(&self, thread_id: &str) -> Result<Vec<String>, CheckpointError> {
        Ok(self
            .threads
            .get(thread_id)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::InterruptPhase;
    use crate::state::GraphState;
    use serde_json::json;

    fn checkpoint(thread: &str, id: &str) -> Checkpoint {
        let mut state = GraphState::new();
        state.set("marker", json!(id));
        Checkpoint::capture(thread, id, &state, "n", InterruptPhase::After)
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = MemoryCheckpointer::new();
        let got = store.get("t1", "never-saved").await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn test_save_then_get_roundtrip() {
        let store = MemoryCheckpointer::new();
        store.save(checkpoint("t1", "c1")).await.unwrap();

        let got = store.get("t1", "c1").await.unwrap().unwrap();
        assert_eq!(got.state.get("marker"), Some(&json!("c1")));
    }

    #[tokio::test]
    async fn test_list_in_save_order() {
        let store = MemoryCheckpointer::new();
        for id in ["c3", "c1", "c2"] {
            store.save(checkpoint("t1", id)).await.unwrap();
        }

        let ids = store.list("t1").await.unwrap();
        assert_eq!(ids, vec!["c3", "c1", "c2"]);
    }

    #[tokio::test]
    async fn test_overwrite_is_silent_and_keeps_one_entry() {
        let store = MemoryCheckpointer::new();
        store.save(checkpoint("t1", "c1")).await.unwrap();

        let mut replacement = checkpoint("t1", "c1");
        replacement.node = "other".to_string();
        store.save(replacement).await.unwrap();

        let ids = store.list("t1").await.unwrap();
        assert_eq!(ids, vec!["c1"]);
        let got = store.get("t1", "c1").await.unwrap().unwrap();
        assert_eq!(got.node, "other");
    }

    #[tokio::test]
    async fn test_threads_are_isolated() {
        let store = MemoryCheckpointer::new();
        store.save(checkpoint("t1", "c1")).await.unwrap();
        store.save(checkpoint("t2", "c1")).await.unwrap();

        assert_eq!(store.list("t1").await.unwrap(), vec!["c1"]);
        assert!(store.get("t2", "c1").await.unwrap().is_some());
        assert!(store.get("t3", "c1").await.unwrap().is_none());
    }
}
