//! # graphflow
//!
//! A state-graph workflow engine: directed graphs of named processing steps
//! executed over a shared, progressively-merged state object, with
//! conditional routing, pause-and-resume interrupts and pluggable
//! checkpointing.
//!
//! ## Quick start
//!
//! ```rust
//! use graphflow::engine::ExecutionOptions;
//! use graphflow::graph::StateGraph;
//! use graphflow::state::StateData;
//! use serde_json::json;
//!
//! # async fn example() -> graphflow::Result<()> {
//! let mut graph = StateGraph::new();
//! graph.add_node_fn("greet", |_state| {
//!     let mut update = StateData::new();
//!     update.insert("greeting".to_string(), json!("hello"));
//!     Ok(Some(update))
//! })?;
//! graph.add_node_fn("close", |_state| Ok(None))?;
//! graph.add_edge("greet", "close")?;
//! graph.set_entry_point("greet")?;
//! graph.add_finish_point("close")?;
//!
//! let compiled = graph.compile()?;
//! let outcome = compiled.execute(StateData::new(), ExecutionOptions::new()).await?;
//! assert_eq!(
//!     outcome.completed_state().and_then(|s| s.get("greeting")),
//!     Some(&json!("hello"))
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`graph`]: graph definition, validation and compilation
//! - [`state`]: execution state and change history
//! - [`engine`]: the step loop, interrupts, resume and retries
//! - [`checkpoint`]: snapshot persistence behind a pluggable trait
//! - [`tools`]: name-keyed tool dispatch
//! - [`agents`]: agent-to-node adaptation, memory, tracking
//! - [`config`]: caller-supplied configuration

#![warn(missing_docs)]

use thiserror::Error;

/// Result type for graphflow operations.
pub type Result<T> = std::result::Result<T, GraphFlowError>;

/// Top-level error aggregating every module's failure modes.
///
/// Node functions return this type directly, so a failing node's original
/// error identity survives retries and reaches the caller unwrapped.
#[derive(Error, Debug)]
pub enum GraphFlowError {
    /// Build- or compile-time graph definition error.
    #[error(transparent)]
    Graph(#[from] graph::GraphError),

    /// The running graph's structure failed to produce a successor.
    #[error(transparent)]
    Execution(#[from] engine::ExecutionError),

    /// Checkpoint persistence error.
    #[error(transparent)]
    Checkpoint(#[from] checkpoint::CheckpointError),

    /// Tool dispatch or execution error.
    #[error(transparent)]
    Tool(#[from] tools::ToolError),

    /// Agent failure.
    #[error(transparent)]
    Agent(#[from] agents::AgentError),

    /// Serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unexpected internal condition.
    #[error("Internal error: {0}")]
    Internal(String),
}

pub mod agents;
pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod graph;
pub mod state;
pub mod tools;
