//! Agents, memory, tools and tracking wired into a graph

use std::sync::Arc;

use async_trait::async_trait;
use graphflow::agents::{
    Agent, AgentError, AgentMemory, AgentNode, AgentState, ExecutionTracker, FnAgent, Message,
};
use graphflow::engine::ExecutionOptions;
use graphflow::graph::StateGraph;
use graphflow::state::StateData;
use graphflow::tools::{CalculatorTool, ToolRegistry};
use parking_lot::Mutex;
use serde_json::json;

/// An agent that records the request in its memory and answers through the
/// calculator tool.
struct SumAgent {
    tools: Arc<ToolRegistry>,
    memory: Mutex<AgentMemory>,
}

#[async_trait]
impl Agent for SumAgent {
    fn name(&self) -> &str {
        "summer"
    }

    fn describe(&self) -> &str {
        "adds the 'a' and 'b' state keys"
    }

    async fn act(&self, mut state: AgentState) -> Result<AgentState, AgentError> {
        let a = state.get("a").cloned().ok_or_else(|| AgentError::MissingInput {
            agent: "summer".to_string(),
            key: "a".to_string(),
        })?;
        let b = state.get("b").cloned().ok_or_else(|| AgentError::MissingInput {
            agent: "summer".to_string(),
            key: "b".to_string(),
        })?;

        let result = self
            .tools
            .execute("calculator", json!({"op": "add", "a": a, "b": b}))
            .await
            .map_err(|err| AgentError::Failed {
                agent: "summer".to_string(),
                message: err.to_string(),
            })?;

        let mut memory = self.memory.lock();
        memory.add("last_sum", result.clone());
        memory.add_history(Message::user(format!("sum {a} and {b}")));
        memory.add_history(Message::assistant(result.to_string()));

        state.set("sum", result);
        Ok(state)
    }
}

#[tokio::test]
async fn agent_node_runs_inside_a_graph() {
    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(CalculatorTool));

    let agent = Arc::new(SumAgent {
        tools: Arc::new(tools),
        memory: Mutex::new(AgentMemory::new()),
    });

    let mut graph = StateGraph::new();
    graph.add_node("summer", AgentNode::new(agent.clone())).unwrap();
    graph
        .add_node_fn("report", |state| {
            let sum = state.get("sum").cloned().unwrap_or(json!(null));
            let mut update = StateData::new();
            update.insert("report".to_string(), json!(format!("total: {sum}")));
            Ok(Some(update))
        })
        .unwrap();
    graph.add_edge("summer", "report").unwrap();
    graph.set_entry_point("summer").unwrap();
    graph.add_finish_point("report").unwrap();
    let compiled = graph.compile().unwrap();

    let mut initial = StateData::new();
    initial.insert("a".to_string(), json!(19));
    initial.insert("b".to_string(), json!(23));

    let outcome = compiled
        .execute(initial, ExecutionOptions::new())
        .await
        .unwrap();

    let state = outcome.completed_state().unwrap();
    assert_eq!(state.get("sum"), Some(&json!(42.0)));
    assert_eq!(state.get("report"), Some(&json!("total: 42.0")));
    // the agent's own input keys survived the wholesale merge
    assert_eq!(state.get("a"), Some(&json!(19)));

    // the agent consulted its memory on the way
    let memory = agent.memory.lock();
    assert_eq!(memory.get("last_sum"), Some(&json!(42.0)));
    assert_eq!(memory.get_history().len(), 2);
}

#[tokio::test]
async fn missing_input_fails_the_run_with_the_agent_error() {
    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(CalculatorTool));
    let agent = Arc::new(SumAgent {
        tools: Arc::new(tools),
        memory: Mutex::new(AgentMemory::new()),
    });

    let mut graph = StateGraph::new();
    graph.add_node("summer", AgentNode::new(agent)).unwrap();
    graph.set_entry_point("summer").unwrap();
    graph.add_finish_point("summer").unwrap();
    let compiled = graph.compile().unwrap();

    let err = compiled
        .execute(StateData::new(), ExecutionOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        graphflow::GraphFlowError::Agent(AgentError::MissingInput { .. })
    ));
}

#[tokio::test]
async fn tracker_records_engine_actions() {
    let mut graph = StateGraph::new();
    graph
        .add_node(
            "echo",
            AgentNode::new(Arc::new(FnAgent::new("echo", |state: AgentState| Ok(state)))),
        )
        .unwrap();
    graph.add_node_fn("tail", |_state| Ok(None)).unwrap();
    graph.add_edge("echo", "tail").unwrap();
    graph.set_entry_point("echo").unwrap();
    graph.add_finish_point("tail").unwrap();
    let compiled = graph.compile().unwrap();

    let tracker = Arc::new(ExecutionTracker::new());
    let opts = ExecutionOptions::new().with_tracker(tracker.clone());

    compiled.execute(StateData::new(), opts).await.unwrap();

    let log = tracker.log();
    let invokes: Vec<&str> = log
        .iter()
        .filter(|r| r.action == "invoke")
        .map(|r| r.actor.as_str())
        .collect();
    assert_eq!(invokes, vec!["echo", "tail"]);

    let stats = tracker.stats();
    assert_eq!(stats.per_actor.get("echo"), Some(&2)); // invoke + merge
    assert!(stats.step_count >= 4);
}
