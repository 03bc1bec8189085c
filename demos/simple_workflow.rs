//! Simple workflow example demonstrating basic graph construction and execution

use graphflow::engine::{ExecutionOptions, ExecutionOutcome};
use graphflow::graph::StateGraph;
use graphflow::state::StateData;
use serde_json::json;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("graphflow - simple workflow example\n");

    // Build the graph: greet -> process -> respond
    let mut graph = StateGraph::new();
    graph.add_node_fn("greet", |state| {
        let name = state
            .get("user_name")
            .and_then(|v| v.as_str())
            .unwrap_or("stranger")
            .to_string();
        let mut update = StateData::new();
        update.insert("greeting".to_string(), json!(format!("Welcome, {name}!")));
        Ok(Some(update))
    })?;
    graph.add_node_fn("process", |_state| {
        let mut update = StateData::new();
        update.insert("processed".to_string(), json!(true));
        Ok(Some(update))
    })?;
    graph.add_node_fn("respond", |state| {
        let greeting = state.get("greeting").cloned().unwrap_or(json!(""));
        let mut update = StateData::new();
        update.insert(
            "response".to_string(),
            json!(format!("{greeting} Task completed.")),
        );
        Ok(Some(update))
    })?;
    graph.add_edge("greet", "process")?;
    graph.add_edge("process", "respond")?;
    graph.set_entry_point("greet")?;
    graph.add_finish_point("respond")?;

    println!("Graph built with {} nodes", graph.node_count());

    let compiled = graph.compile()?;
    println!("Graph compiled and ready for execution\n");

    let mut initial = StateData::new();
    initial.insert("user_name".to_string(), json!("Alice"));

    let outcome = compiled.execute(initial, ExecutionOptions::new()).await?;

    let ExecutionOutcome::Completed { state, history } = outcome else {
        unreachable!("no interrupts configured");
    };

    println!("Final state:");
    for (key, value) in &state {
        println!("  {key}: {value}");
    }

    println!("\nExecution history:");
    for (i, change) in history.iter().enumerate() {
        println!(
            "  {}. {} ({:?}) -> {:?}",
            i + 1,
            change.node,
            change.kind,
            change.keys_changed
        );
    }

    Ok(())
}
