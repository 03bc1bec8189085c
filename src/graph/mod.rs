//! Graph definition and compilation
//!
//! [`StateGraph`] is the mutable builder: nodes, transitions, entry point,
//! finish points and interrupt markers are registered here. [`compile`]
//! validates the definition once and produces an immutable [`CompiledGraph`]
//! that the execution engine drives; the builder can keep being mutated
//! without affecting already-compiled instances.
//!
//! [`compile`]: StateGraph::compile

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod edge;
pub mod node;

pub use edge::{ConditionalEdges, Predicate, Transition};
pub use node::{AsyncFnNode, FnNode, NodeFn, NodeFunction, NodeFuture};

use crate::state::StateData;

/// Errors raised while building or compiling a graph definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A node with this name is already registered.
    #[error("Node already registered: {0}")]
    DuplicateNode(String),

    /// An operation referenced a node name that is not registered.
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// The node already routes; plain edges and conditional groups are
    /// mutually exclusive per node and the successor must be deterministic.
    #[error("Conflicting edge for node '{0}': it already has an outgoing transition")]
    ConflictingEdge(String),

    /// The definition failed compile-time validation.
    #[error("Invalid graph: {0}")]
    Validation(String),
}

/// Where an interrupt marker pauses execution relative to its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptPhase {
    /// Pause immediately before invoking the node.
    Before,

    /// Pause immediately after the node's result has been merged.
    After,
}

/// Mutable builder for a state-graph workflow.
pub struct StateGraph {
    nodes: IndexMap<String, Arc<dyn NodeFunction>>,
    transitions: HashMap<String, Transition>,
    entry_point: Option<String>,
    finish_points: HashSet<String>,
    interrupt_before: HashSet<String>,
    interrupt_after: HashSet<String>,
}

impl fmt::Debug for StateGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateGraph")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("transitions", &self.transitions)
            .field("entry_point", &self.entry_point)
            .field("finish_points", &self.finish_points)
            .field("interrupt_before", &self.interrupt_before)
            .field("interrupt_after", &self.interrupt_after)
            .finish_non_exhaustive()
    }
}

impl StateGraph {
    /// Create an empty graph definition.
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            transitions: HashMap::new(),
            entry_point: None,
            finish_points: HashSet::new(),
            interrupt_before: HashSet::new(),
            interrupt_after: HashSet::new(),
        }
    }

    /// Register a node under a unique name.
    pub fn add_node<N>(&mut self, name: impl Into<String>, node: N) -> Result<&mut Self, GraphError>
    where
        N: NodeFunction + 'static,
    {
        let name = name.into();
        if self.nodes.contains_key(&name) {
            return Err(GraphError::DuplicateNode(name));
        }
        self.nodes.insert(name, Arc::new(node));
        Ok(self)
    }

    /// Register a closure as a node. Convenience over [`add_node`].
    ///
    /// [`add_node`]: StateGraph::add_node
    pub fn add_node_fn<F>(&mut self, name: impl Into<String>, f: F) -> Result<&mut Self, GraphError>
    where
        F: Fn(StateData) -> crate::Result<Option<StateData>> + Send + Sync + 'static,
    {
        self.add_node(name, FnNode::new(f))
    }

    /// Add an unconditional edge. Both endpoints must be registered, and
    /// `from` must not already route.
    pub fn add_edge(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Result<&mut Self, GraphError> {
        let from = from.into();
        let to = to.into();
        self.require_node(&from)?;
        self.require_node(&to)?;
        if self.transitions.contains_key(&from) {
            return Err(GraphError::ConflictingEdge(from));
        }
        self.transitions.insert(from, Transition::Edge(to));
        Ok(self)
    }

    /// Add a conditional edge group: `predicate` maps the post-merge state to
    /// a label, `mapping` maps labels to successor nodes. `from` and every
    /// mapping target must be registered, and `from` must not already route.
    pub fn add_conditional_edges<P>(
        &mut self,
        from: impl Into<String>,
        predicate: P,
        mapping: HashMap<String, String>,
    ) -> Result<&mut Self, GraphError>
    where
        P: Fn(&StateData) -> String + Send + Sync + 'static,
    {
        let from = from.into();
        self.require_node(&from)?;
        for target in mapping.values() {
            self.require_node(target)?;
        }
        if self.transitions.contains_key(&from) {
            return Err(GraphError::ConflictingEdge(from));
        }
        self.transitions
            .insert(from, Transition::conditional(predicate, mapping));
        Ok(self)
    }

    /// Designate the node execution starts from.
    pub fn set_entry_point(&mut self, name: impl Into<String>) -> Result<&mut Self, GraphError> {
        let name = name.into();
        self.require_node(&name)?;
        self.entry_point = Some(name);
        Ok(self)
    }

    /// Add a node at which execution terminates successfully.
    pub fn add_finish_point(&mut self, name: impl Into<String>) -> Result<&mut Self, GraphError> {
        let name = name.into();
        self.require_node(&name)?;
        self.finish_points.insert(name);
        Ok(self)
    }

    /// Attach an interrupt marker: execution pauses before or after the node.
    pub fn set_interrupt(
        &mut self,
        name: impl Into<String>,
        phase: InterruptPhase,
    ) -> Result<&mut Self, GraphError> {
        let name = name.into();
        self.require_node(&name)?;
        match phase {
            InterruptPhase::Before => self.interrupt_before.insert(name),
            InterruptPhase::After => self.interrupt_after.insert(name),
        };
        Ok(self)
    }

    /// Number of registered nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether a node name is registered.
    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Validate the definition and freeze it into an executable graph.
    ///
    /// Checks that an entry point is set, at least one finish point exists,
    /// and every node reachable from the entry either routes onward or is a
    /// finish point. Cycles are permitted; termination relies on finish
    /// points or the executor's step limit.
    pub fn compile(&self) -> Result<CompiledGraph, GraphError> {
        let entry_point = self
            .entry_point
            .clone()
            .ok_or_else(|| GraphError::Validation("entry point not set".to_string()))?;

        if self.finish_points.is_empty() {
            return Err(GraphError::Validation(
                "at least one finish point is required".to_string(),
            ));
        }

        // Walk from the entry over every reachable successor; a reachable
        // node with no transition must be a finish point.
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([entry_point.clone()]);
        while let Some(name) = queue.pop_front() {
            if !visited.insert(name.clone()) {
                continue;
            }
            match self.transitions.get(&name) {
                Some(transition) => {
                    for target in transition.targets() {
                        if !visited.contains(target) {
                            queue.push_back(target.to_string());
                        }
                    }
                }
                None => {
                    if !self.finish_points.contains(&name) {
                        return Err(GraphError::Validation(format!(
                            "node '{name}' has no outgoing transition and is not a finish point"
                        )));
                    }
                }
            }
        }

        Ok(CompiledGraph {
            nodes: self.nodes.clone(),
            transitions: self.transitions.clone(),
            entry_point,
            finish_points: self.finish_points.clone(),
            interrupt_before: self.interrupt_before.clone(),
            interrupt_after: self.interrupt_after.clone(),
        })
    }

    fn require_node(&self, name: &str) -> Result<(), GraphError> {
        if self.nodes.contains_key(name) {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(name.to_string()))
        }
    }
}

impl Default for StateGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// A validated, immutable graph ready for execution.
///
/// Holds a value copy of the definition taken at compile time; the node
/// functions themselves are shared behind `Arc` and are never mutated.
/// Execution entry points ([`execute`], [`resume`]) live in the engine
/// module.
///
/// [`execute`]: CompiledGraph::execute
/// [`resume`]: CompiledGraph::resume
#[derive(Clone)]
pub struct CompiledGraph {
    pub(crate) nodes: IndexMap<String, Arc<dyn NodeFunction>>,
    pub(crate) transitions: HashMap<String, Transition>,
    pub(crate) entry_point: String,
    pub(crate) finish_points: HashSet<String>,
    pub(crate) interrupt_before: HashSet<String>,
    pub(crate) interrupt_after: HashSet<String>,
}

impl fmt::Debug for CompiledGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledGraph")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("transitions", &self.transitions)
            .field("entry_point", &self.entry_point)
            .field("finish_points", &self.finish_points)
            .field("interrupt_before", &self.interrupt_before)
            .field("interrupt_after", &self.interrupt_after)
            .finish_non_exhaustive()
    }
}

impl CompiledGraph {
    /// The declared entry point.
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// The declared finish points.
    pub fn finish_points(&self) -> &HashSet<String> {
        &self.finish_points
    }

    /// Registered node names, in registration order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }
}
