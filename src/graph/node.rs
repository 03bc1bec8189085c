//! Node types for graph workflows

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::state::StateData;
use crate::Result;

/// Boxed future returned by closure-backed nodes.
pub type NodeFuture = Pin<Box<dyn Future<Output = Result<Option<StateData>>> + Send>>;

/// Function signature for closure-backed async nodes.
pub type NodeFn = Box<dyn Fn(StateData) -> NodeFuture + Send + Sync>;

/// A unit of work in the graph.
///
/// A node receives a snapshot of the current state and returns a partial
/// update to merge back, or `None` when it has nothing to contribute. Nodes
/// are registered once at build time and never mutated afterwards; a node can
/// run more than once only when the graph routes through a cycle.
#[async_trait]
pub trait NodeFunction: Send + Sync {
    /// Execute the node against a snapshot of the current state.
    async fn invoke(&self, state: StateData) -> Result<Option<StateData>>;
}

/// Adapter turning a plain synchronous closure into a node.
pub struct FnNode<F> {
    function: F,
}

impl<F> FnNode<F>
where
    F: Fn(StateData) -> Result<Option<StateData>> + Send + Sync,
{
    pub fn new(function: F) -> Self {
        Self { function }
    }
}

#[async_trait]
impl<F> NodeFunction for FnNode<F>
where
    F: Fn(StateData) -> Result<Option<StateData>> + Send + Sync,
{
    async fn invoke(&self, state: StateData) -> Result<Option<StateData>> {
        (self.function)(state)
    }
}

/// Adapter for nodes that need to await other work.
pub struct AsyncFnNode {
    function: NodeFn,
}

impl AsyncFnNode {
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(StateData) -> NodeFuture + Send + Sync + 'static,
    {
        Self {
            function: Box::new(function),
        }
    }
}

#[async_trait]
impl NodeFunction for AsyncFnNode {
    async fn invoke(&self, state: StateData) -> Result<Option<StateData>> {
        (self.function)(state).await
    }
}
