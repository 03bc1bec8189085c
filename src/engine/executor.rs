//! The step loop driving a compiled graph
//!
//! One logical thread of control per run: nodes execute strictly one at a
//! time, successors are decided by the current node's transition against the
//! post-merge state, and the loop ends at a finish point or pauses at an
//! interrupt marker.

use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::checkpoint::Checkpoint;
use crate::engine::{ExecutionError, ExecutionOptions, ExecutionOutcome, Interrupt};
use crate::graph::{CompiledGraph, InterruptPhase, Transition};
use crate::state::{GraphState, StateData};
use crate::{GraphFlowError, Result};

/// Where the loop goes after a node: a named successor or termination.
enum Successor {
    Next(String),
    Done,
}

impl CompiledGraph {
    /// Execute the graph from its entry point over the given initial state.
    ///
    /// Returns [`ExecutionOutcome::Completed`] with the final state snapshot
    /// and full change history once a finish point is reached, or
    /// [`ExecutionOutcome::Paused`] when an interrupt marker is hit. Node
    /// failures propagate unchanged.
    pub async fn execute(
        &self,
        initial: StateData,
        opts: ExecutionOptions,
    ) -> Result<ExecutionOutcome> {
        let thread_id = opts
            .thread_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        info!(%thread_id, entry = %self.entry_point, "starting graph execution");

        let state = GraphState::from_data(initial);
        self.run_loop(state, self.entry_point.clone(), None, thread_id, &opts)
            .await
    }

    /// Resume a paused run from a saved checkpoint.
    ///
    /// The checkpoint records the interrupted node and phase; resuming a
    /// `Before` pause invokes that node without re-raising its interrupt,
    /// while resuming an `After` pause continues at successor resolution.
    /// `additional_input` is merged into the restored state first.
    pub async fn resume(
        &self,
        thread_id: &str,
        checkpoint_id: &str,
        additional_input: Option<StateData>,
        opts: ExecutionOptions,
    ) -> Result<ExecutionOutcome> {
        let checkpointer = opts
            .checkpointer
            .as_ref()
            .ok_or(ExecutionError::CheckpointerRequired)?;

        let checkpoint = checkpointer
            .get(thread_id, checkpoint_id)
            .await?
            .ok_or_else(|| crate::checkpoint::CheckpointError::CheckpointMissing {
                thread_id: thread_id.to_string(),
                checkpoint_id: checkpoint_id.to_string(),
            })?;

        info!(
            %thread_id,
            %checkpoint_id,
            node = %checkpoint.node,
            phase = ?checkpoint.phase,
            "resuming graph execution"
        );

        let mut state = GraphState::from_parts(checkpoint.state, checkpoint.history);
        if let Some(extra) = additional_input {
            if !extra.is_empty() {
                state.merge("__resume__", Some(extra));
            }
        }

        match checkpoint.phase {
            InterruptPhase::Before => {
                // Re-enter at the interrupted node, but do not re-raise the
                // interrupt that paused us.
                self.run_loop(
                    state,
                    checkpoint.node.clone(),
                    Some(checkpoint.node),
                    thread_id.to_string(),
                    &opts,
                )
                .await
            }
            InterruptPhase::After => {
                // The node already ran and merged; pick up at its successor.
                match self.successor(&checkpoint.node, &state)? {
                    Successor::Done => Ok(self.complete(state)),
                    Successor::Next(next) => {
                        self.run_loop(state, next, None, thread_id.to_string(), &opts)
                            .await
                    }
                }
            }
        }
    }

    async fn run_loop(
        &self,
        mut state: GraphState,
        start: String,
        mut skip_before_interrupt: Option<String>,
        thread_id: String,
        opts: &ExecutionOptions,
    ) -> Result<ExecutionOutcome> {
        let mut current = start;
        let mut steps = 0usize;

        loop {
            if let Some(limit) = opts.max_steps {
                if steps >= limit {
                    return Err(ExecutionError::StepLimitExceeded(limit).into());
                }
            }
            steps += 1;

            let resumed_past = skip_before_interrupt
                .take()
                .is_some_and(|node| node == current);
            if !resumed_past && self.interrupt_before.contains(&current) {
                return self
                    .pause(state, &current, InterruptPhase::Before, &thread_id, opts)
                    .await;
            }

            debug!(node = %current, step = steps, "invoking node");
            if let Some(tracker) = &opts.tracker {
                tracker.log_step(&current, "invoke", json!({ "step": steps }));
            }

            let node = self.nodes.get(&current).cloned().ok_or_else(|| {
                GraphFlowError::Internal(format!("node '{current}' missing from compiled graph"))
            })?;
            let result = match &opts.retry {
                Some(policy) => policy.run(|| node.invoke(state.snapshot())).await?,
                None => node.invoke(state.snapshot()).await?,
            };

            let kind = state.merge(&current, result);
            debug!(node = %current, kind = ?kind, "merged node result");
            if let Some(tracker) = &opts.tracker {
                let keys: Vec<&String> = state
                    .history()
                    .last()
                    .map(|change| change.keys_changed.iter().collect())
                    .unwrap_or_default();
                tracker.log_step(&current, "merge", json!({ "kind": kind, "keys": keys }));
            }

            if opts.checkpoint_each_step {
                if let Some(checkpointer) = &opts.checkpointer {
                    let checkpoint = Checkpoint::capture(
                        &thread_id,
                        Uuid::new_v4().to_string(),
                        &state,
                        &current,
                        InterruptPhase::After,
                    );
                    checkpointer.save(checkpoint).await?;
                }
            }

            if self.interrupt_after.contains(&current) {
                return self
                    .pause(state, &current, InterruptPhase::After, &thread_id, opts)
                    .await;
            }

            match self.successor(&current, &state)? {
                Successor::Done => {
                    info!(%thread_id, node = %current, steps, "graph execution completed");
                    if let Some(tracker) = &opts.tracker {
                        tracker.log_step(&current, "finish", json!({ "steps": steps }));
                    }
                    return Ok(self.complete(state));
                }
                Successor::Next(next) => {
                    debug!(from = %current, to = %next, "transition");
                    current = next;
                }
            }
        }
    }

    /// Resolve the successor of `node` against the post-merge state:
    /// conditional routing first, then the plain edge, then finish-point
    /// termination; anything else is a dead end.
    fn successor(&self, node: &str, state: &GraphState) -> Result<Successor> {
        match self.transitions.get(node) {
            Some(Transition::Edge(to)) => Ok(Successor::Next(to.clone())),
            Some(Transition::Conditional(cond)) => {
                let (label, target) = cond.route(&state.values);
                match target {
                    Some(to) => Ok(Successor::Next(to.to_string())),
                    None => Err(ExecutionError::UnmappedTransition {
                        node: node.to_string(),
                        label,
                    }
                    .into()),
                }
            }
            None if self.finish_points.contains(node) => Ok(Successor::Done),
            None => Err(ExecutionError::DeadEnd(node.to_string()).into()),
        }
    }

    async fn pause(
        &self,
        state: GraphState,
        node: &str,
        phase: InterruptPhase,
        thread_id: &str,
        opts: &ExecutionOptions,
    ) -> Result<ExecutionOutcome> {
        let checkpoint_id = Uuid::new_v4().to_string();
        if let Some(checkpointer) = &opts.checkpointer {
            let checkpoint =
                Checkpoint::capture(thread_id, &checkpoint_id, &state, node, phase);
            checkpointer.save(checkpoint).await?;
        }

        info!(%thread_id, %node, ?phase, %checkpoint_id, "execution paused at interrupt");
        if let Some(tracker) = &opts.tracker {
            tracker.log_step(
                node,
                "interrupt",
                json!({ "phase": phase, "checkpoint_id": checkpoint_id }),
            );
        }

        Ok(ExecutionOutcome::Paused(Interrupt {
            node: node.to_string(),
            phase,
            thread_id: thread_id.to_string(),
            checkpoint_id,
            state: state.values,
        }))
    }

    fn complete(&self, state: GraphState) -> ExecutionOutcome {
        ExecutionOutcome::Completed {
            state: state.values,
            history: state.history.into_vec(),
        }
    }
}
