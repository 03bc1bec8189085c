//! Graph execution engine
//!
//! The engine drives a [`CompiledGraph`](crate::graph::CompiledGraph) as a
//! sequential step loop over node names: invoke the current node, merge its
//! partial update, then follow the node's transition to the successor until a
//! finish point is reached. Pausing at an interrupt marker is a first-class
//! outcome ([`ExecutionOutcome::Paused`]), not an error.

mod executor;
pub mod retry;

pub use retry::RetryPolicy;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agents::ExecutionTracker;
use crate::checkpoint::Checkpointer;
use crate::graph::InterruptPhase;
use crate::state::{StateChange, StateData};

/// Default cap on executed steps per run; guards against unbounded cycles in
/// a misrouted graph. Set [`ExecutionOptions::max_steps`] to `None` to lift.
pub const DEFAULT_MAX_STEPS: usize = 100;

/// Errors raised by the step loop when the graph's own structure fails to
/// produce a successor. These indicate a defect in the graph definition and
/// are not recoverable by retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The current node has no outgoing transition and is not a finish point.
    #[error("Dead end at node '{0}': no outgoing transition and not a finish point")]
    DeadEnd(String),

    /// A conditional predicate produced a label absent from its mapping.
    #[error("Unmapped transition at node '{node}': label '{label}' has no mapping entry")]
    UnmappedTransition { node: String, label: String },

    /// The step cap was exceeded; the graph likely cycles without reaching a
    /// finish point.
    #[error("Step limit of {0} exceeded; possible unbounded cycle")]
    StepLimitExceeded(usize),

    /// `resume` was called without a checkpoint store configured.
    #[error("Resume requires a checkpoint store")]
    CheckpointerRequired,
}

/// A pause raised by an interrupt marker, carrying everything the caller
/// needs to resume later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interrupt {
    /// Node the marker is attached to.
    pub node: String,

    /// Whether execution stopped before or after invoking the node.
    pub phase: InterruptPhase,

    /// Logical run identifier.
    pub thread_id: String,

    /// Checkpoint saved for this pause; pass to `resume`.
    pub checkpoint_id: String,

    /// Snapshot of the state at the pause.
    pub state: StateData,
}

/// The result of driving a graph: ran to a finish point, or paused at an
/// interrupt marker.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// A finish point was reached.
    Completed {
        state: StateData,
        history: Vec<StateChange>,
    },

    /// An interrupt marker paused the run; resumable via the carried ids.
    Paused(Interrupt),
}

impl ExecutionOutcome {
    /// Final state if the run completed.
    pub fn completed_state(&self) -> Option<&StateData> {
        match self {
            ExecutionOutcome::Completed { state, .. } => Some(state),
            ExecutionOutcome::Paused(_) => None,
        }
    }

    /// The interrupt if the run paused.
    pub fn interrupt(&self) -> Option<&Interrupt> {
        match self {
            ExecutionOutcome::Paused(interrupt) => Some(interrupt),
            ExecutionOutcome::Completed { .. } => None,
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, ExecutionOutcome::Paused(_))
    }
}

/// Caller-supplied execution configuration.
///
/// Collaborators (checkpoint store, tracker) are passed in explicitly with
/// caller-controlled lifetimes; the engine owns none of them.
#[derive(Clone)]
pub struct ExecutionOptions {
    /// Logical run identifier; a fresh UUID is generated when unset.
    pub thread_id: Option<String>,

    /// Where interrupt (and optionally per-step) snapshots are saved.
    pub checkpointer: Option<Arc<dyn Checkpointer>>,

    /// Applied to every node invocation when set.
    pub retry: Option<RetryPolicy>,

    /// Save a checkpoint after every node merge, not just at interrupts.
    pub checkpoint_each_step: bool,

    /// Records one entry per engine action when supplied.
    pub tracker: Option<Arc<ExecutionTracker>>,

    /// Cap on executed steps. `None` disables the guard and restores the
    /// unbounded behavior of a cyclic misrouted graph.
    pub max_steps: Option<usize>,
}

impl ExecutionOptions {
    pub fn new() -> Self {
        Self {
            thread_id: None,
            checkpointer: None,
            retry: None,
            checkpoint_each_step: false,
            tracker: None,
            max_steps: Some(DEFAULT_MAX_STEPS),
        }
    }

    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_checkpointer(mut self, checkpointer: Arc<dyn Checkpointer>) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn with_checkpoint_each_step(mut self) -> Self {
        self.checkpoint_each_step = true;
        self
    }

    pub fn with_tracker(mut self, tracker: Arc<ExecutionTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn with_max_steps(mut self, max_steps: Option<usize>) -> Self {
        self.max_steps = max_steps;
        self
    }
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self::new()
    }
}
