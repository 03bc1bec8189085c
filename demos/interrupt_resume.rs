//! Interrupt and resume example: pause before a gated node, collect operator
//! input, and resume from the saved checkpoint

use std::sync::Arc;

use graphflow::checkpoint::MemoryCheckpointer;
use graphflow::engine::{ExecutionOptions, ExecutionOutcome};
use graphflow::graph::{InterruptPhase, StateGraph};
use graphflow::state::StateData;
use serde_json::json;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("graphflow - interrupt/resume example\n");

    let mut graph = StateGraph::new();
    graph.add_node_fn("draft", |_state| {
        let mut update = StateData::new();
        update.insert("draft".to_string(), json!("refund of $120 to customer 4821"));
        Ok(Some(update))
    })?;
    graph.add_node_fn("apply", |state| {
        let approved = state
            .get("approved")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let mut update = StateData::new();
        update.insert(
            "result".to_string(),
            if approved {
                json!("refund applied")
            } else {
                json!("refund rejected")
            },
        );
        Ok(Some(update))
    })?;
    graph.add_edge("draft", "apply")?;
    graph.set_entry_point("draft")?;
    graph.add_finish_point("apply")?;
    // require a human decision before the refund is applied
    graph.set_interrupt("apply", InterruptPhase::Before)?;
    let compiled = graph.compile()?;

    let store = Arc::new(MemoryCheckpointer::new());
    let opts = ExecutionOptions::new()
        .with_thread_id("refund-4821")
        .with_checkpointer(store.clone());

    let outcome = compiled.execute(StateData::new(), opts.clone()).await?;

    let ExecutionOutcome::Paused(interrupt) = outcome else {
        unreachable!("the interrupt marker pauses the run");
    };
    println!(
        "paused {:?} node '{}' (checkpoint {})",
        interrupt.phase, interrupt.node, interrupt.checkpoint_id
    );
    println!("pending: {}\n", interrupt.state["draft"]);

    // the operator approves; resume with the decision as additional input
    let mut decision = StateData::new();
    decision.insert("approved".to_string(), json!(true));

    let resumed = compiled
        .resume(
            &interrupt.thread_id,
            &interrupt.checkpoint_id,
            Some(decision),
            opts,
        )
        .await?;

    let ExecutionOutcome::Completed { state, history } = resumed else {
        unreachable!("no further interrupts");
    };
    println!("completed: {}", state["result"]);
    println!("history: {} entries", history.len());

    Ok(())
}
