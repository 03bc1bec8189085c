//! Transition types: how the executor picks a successor node
//!
//! A node routes through exactly one of two shapes: an unconditional edge to a
//! fixed successor, or a conditional group whose predicate maps the post-merge
//! state to a label and the label to a successor.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::state::StateData;

/// Predicate evaluated against the post-merge state to pick a routing label.
pub type Predicate = Arc<dyn Fn(&StateData) -> String + Send + Sync>;

/// Outgoing routing rule attached to a node.
#[derive(Clone)]
pub enum Transition {
    /// Unconditional successor.
    Edge(String),

    /// Predicate-driven routing over a label → successor mapping.
    Conditional(ConditionalEdges),
}

/// A conditional edge group: predicate plus label mapping.
#[derive(Clone)]
pub struct ConditionalEdges {
    pub predicate: Predicate,
    pub mapping: HashMap<String, String>,
}

impl Transition {
    pub fn edge(to: impl Into<String>) -> Self {
        Transition::Edge(to.into())
    }

    pub fn conditional<P>(predicate: P, mapping: HashMap<String, String>) -> Self
    where
        P: Fn(&StateData) -> String + Send + Sync + 'static,
    {
        Transition::Conditional(ConditionalEdges {
            predicate: Arc::new(predicate),
            mapping,
        })
    }

    /// Successor names this transition can reach.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Transition::Edge(to) => vec![to.as_str()],
            Transition::Conditional(cond) => {
                cond.mapping.values().map(String::as_str).collect()
            }
        }
    }
}

impl ConditionalEdges {
    /// Evaluate the predicate and look the label up in the mapping. Returns
    /// the label together with the mapped successor, if any.
    pub fn route(&self, state: &StateData) -> (String, Option<&str>) {
        let label = (self.predicate)(state);
        let target = self.mapping.get(&label).map(String::as_str);
        (label, target)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Edge(to) => f.debug_tuple("Edge").field(to).finish(),
            Transition::Conditional(cond) => f
                .debug_struct("Conditional")
                .field("mapping", &cond.mapping)
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_edge_targets() {
        let t = Transition::edge("next");
        assert_eq!(t.targets(), vec!["next"]);
    }

    #[test]
    fn test_conditional_route() {
        let mapping = HashMap::from([
            ("high".to_string(), "escalate".to_string()),
            ("low".to_string(), "archive".to_string()),
        ]);
        let t = Transition::conditional(
            |state: &StateData| {
                if state.get("score").and_then(|v| v.as_i64()).unwrap_or(0) > 5 {
                    "high".to_string()
                } else {
                    "low".to_string()
                }
            },
            mapping,
        );

        let Transition::Conditional(cond) = &t else {
            panic!("expected conditional transition");
        };

        let mut state = StateData::new();
        state.insert("score".to_string(), json!(9));
        let (label, target) = cond.route(&state);
        assert_eq!(label, "high");
        assert_eq!(target, Some("escalate"));

        state.insert("score".to_string(), json!(1));
        let (label, target) = cond.route(&state);
        assert_eq!(label, "low");
        assert_eq!(target, Some("archive"));
    }

    #[test]
    fn test_conditional_unmapped_label() {
        let mapping = HashMap::from([("known".to_string(), "next".to_string())]);
        let t = Transition::conditional(|_: &StateData| "surprise".to_string(), mapping);

        let Transition::Conditional(cond) = &t else {
            panic!("expected conditional transition");
        };
        let (label, target) = cond.route(&StateData::new());
        assert_eq!(label, "surprise");
        assert_eq!(target, None);
    }
}
