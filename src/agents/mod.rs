//! Agent integration
//!
//! An agent is a higher-level actor with its own view of state, typically
//! backed by memory and tool access. [`AgentNode`] adapts one to the graph's
//! node contract: graph state in, the agent's returned state merged back
//! wholesale as the partial update.

pub mod memory;
pub mod tracker;

pub use memory::{AgentMemory, Message, MessageRole};
pub use tracker::{ExecutionTracker, StepRecord, TrackerStats};

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::graph::NodeFunction;
use crate::state::StateData;

/// Errors raised by agents themselves.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// The agent's action failed.
    #[error("Agent '{agent}' failed: {message}")]
    Failed { agent: String, message: String },

    /// The agent required a state key that was absent.
    #[error("Agent '{agent}' missing required input '{key}'")]
    MissingInput { agent: String, key: String },
}

/// An agent's view of execution state: the raw mapping with typed helpers.
#[derive(Debug, Clone, Default)]
pub struct AgentState {
    data: StateData,
}

impl AgentState {
    pub fn from_data(data: StateData) -> Self {
        Self { data }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// The full underlying mapping.
    pub fn into_data(self) -> StateData {
        self.data
    }
}

/// An entity with memory and tool access that acts on execution state.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Unique agent name; doubles as the node name when adapted.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn describe(&self) -> &str {
        ""
    }

    /// Act on the current state and return the updated state.
    async fn act(&self, state: AgentState) -> Result<AgentState, AgentError>;
}

/// Adapts an [`Agent`] to the graph's [`NodeFunction`] contract.
pub struct AgentNode {
    agent: Arc<dyn Agent>,
}

impl AgentNode {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self { agent }
    }

    pub fn name(&self) -> &str {
        self.agent.name()
    }
}

#[async_trait]
impl NodeFunction for AgentNode {
    async fn invoke(&self, state: StateData) -> crate::Result<Option<StateData>> {
        let view = AgentState::from_data(state);
        let updated = self.agent.act(view).await?;
        // the agent's full resulting state becomes the partial update,
        // merged wholesale
        Ok(Some(updated.into_data()))
    }
}

/// Closure-backed agent, for small actors that need no struct of their own.
pub struct FnAgent<F> {
    name: String,
    action: F,
}

impl<F> FnAgent<F>
where
    F: Fn(AgentState) -> Result<AgentState, AgentError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, action: F) -> Self {
        Self {
            name: name.into(),
            action,
        }
    }
}

#[async_trait]
impl<F> Agent for FnAgent<F>
where
    F: Fn(AgentState) -> Result<AgentState, AgentError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn act(&self, state: AgentState) -> Result<AgentState, AgentError> {
        (self.action)(state)
    }
}
