//! Conditional routing example: a predicate over post-merge state picks the
//! successor branch

use std::collections::HashMap;

use graphflow::engine::ExecutionOptions;
use graphflow::graph::StateGraph;
use graphflow::state::StateData;
use serde_json::json;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("graphflow - conditional routing example\n");

    let mut graph = StateGraph::new();
    graph.add_node_fn("triage", |state| {
        let severity = state
            .get("report")
            .and_then(|v| v.as_str())
            .map(|text| if text.contains("outage") { 9 } else { 2 })
            .unwrap_or(0);
        let mut update = StateData::new();
        update.insert("severity".to_string(), json!(severity));
        Ok(Some(update))
    })?;
    graph.add_node_fn("page_oncall", |_state| {
        let mut update = StateData::new();
        update.insert("action".to_string(), json!("paged the on-call engineer"));
        Ok(Some(update))
    })?;
    graph.add_node_fn("file_ticket", |_state| {
        let mut update = StateData::new();
        update.insert("action".to_string(), json!("filed a routine ticket"));
        Ok(Some(update))
    })?;

    graph.add_conditional_edges(
        "triage",
        |state: &StateData| {
            if state.get("severity").and_then(|v| v.as_i64()).unwrap_or(0) >= 7 {
                "urgent".to_string()
            } else {
                "routine".to_string()
            }
        },
        HashMap::from([
            ("urgent".to_string(), "page_oncall".to_string()),
            ("routine".to_string(), "file_ticket".to_string()),
        ]),
    )?;
    graph.set_entry_point("triage")?;
    graph.add_finish_point("page_oncall")?;
    graph.add_finish_point("file_ticket")?;
    let compiled = graph.compile()?;

    for report in ["database outage in eu-west", "typo on the pricing page"] {
        let mut initial = StateData::new();
        initial.insert("report".to_string(), json!(report));

        let outcome = compiled
            .execute(initial, ExecutionOptions::new())
            .await?;
        let state = outcome.completed_state().expect("no interrupts configured");

        println!("report: {report}");
        println!("  severity: {}", state["severity"]);
        println!("  action:   {}\n", state["action"]);
    }

    Ok(())
}
