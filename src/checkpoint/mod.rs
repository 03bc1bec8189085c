//! Checkpointing and state persistence
//!
//! Checkpoints are structural snapshots of execution state, keyed by
//! `(thread_id, checkpoint_id)`. A thread id scopes one logical run; the
//! checkpoint id identifies a point in time within it. The node and phase
//! recorded alongside the snapshot are what `resume` needs to re-enter the
//! step loop without immediately re-interrupting. Only plain state data is
//! ever stored — never node functions or other executable values.

mod memory;

pub use memory::MemoryCheckpointer;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::InterruptPhase;
use crate::state::{GraphState, StateChange, StateData};

/// Errors related to checkpoint persistence.
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// `resume` named a checkpoint that was never saved. Plain `get` calls
    /// report a missing key as `None`, not as an error.
    #[error("No checkpoint '{checkpoint_id}' for thread '{thread_id}'")]
    CheckpointMissing {
        thread_id: String,
        checkpoint_id: String,
    },

    /// A storage backend failed to read or write.
    #[error("Checkpoint storage failed: {0}")]
    Storage(String),
}

/// A persisted snapshot of execution state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Logical run this checkpoint belongs to.
    pub thread_id: String,

    /// Identifies this point in time within the thread.
    pub checkpoint_id: String,

    /// Structural copy of the state values at save time.
    pub state: StateData,

    /// Change history up to the save point.
    pub history: Vec<StateChange>,

    /// Node the executor was positioned at.
    pub node: String,

    /// Whether the pause happened before or after invoking `node`.
    pub phase: InterruptPhase,

    /// When the checkpoint was created.
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    /// Snapshot the given execution state at a node/phase position.
    pub fn capture(
        thread_id: impl Into<String>,
        checkpoint_id: impl Into<String>,
        state: &GraphState,
        node: impl Into<String>,
        phase: InterruptPhase,
    ) -> Self {
        Self {
            thread_id: thread_id.into(),
            checkpoint_id: checkpoint_id.into(),
            state: state.snapshot(),
            history: state.history().to_vec(),
            node: node.into(),
            phase,
            created_at: Utc::now(),
        }
    }
}

/// Pluggable checkpoint storage.
///
/// Implementations must keep distinct thread ids isolated under concurrent
/// access; within a single thread id last-writer-wins is acceptable, since a
/// logical run executes sequentially.
#[async_trait]
pub trait Checkpointer: Send + Sync {
    /// Store a snapshot. Overwrites silently if the `(thread_id,
    /// checkpoint_id)` pair already exists.
    async fn save(&self, checkpoint: Checkpoint) -> Result<(), CheckpointError>;

    /// Fetch a snapshot. A missing key is `Ok(None)`, never an error.
    async fn get(
        &self,
        thread_id: &str,
        checkpoint_id: &str,
    ) -> Result<Option<Checkpoint>, CheckpointError>;

    /// Checkpoint ids for a thread, in save order.
    async fn list(&self, thread_id: &str) -> Result<Vec<String>, CheckpointError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_capture_copies_state_and_position() {
        let mut state = GraphState::new();
        state.set("k", json!("v"));
        let mut update = StateData::new();
        update.insert("n".to_string(), json!(1));
        state.merge("node1", Some(update));

        let cp = Checkpoint::capture("t1", "c1", &state, "node2", InterruptPhase::Before);

        assert_eq!(cp.thread_id, "t1");
        assert_eq!(cp.checkpoint_id, "c1");
        assert_eq!(cp.node, "node2");
        assert_eq!(cp.phase, InterruptPhase::Before);
        assert_eq!(cp.state.get("k"), Some(&json!("v")));
        assert_eq!(cp.history.len(), 1);

        // the captured snapshot is detached from the live state
        state.set("k", json!("changed"));
        assert_eq!(cp.state.get("k"), Some(&json!("v")));
    }
}
