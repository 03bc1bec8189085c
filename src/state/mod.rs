//! State management for graph execution
//!
//! Execution state is an ordered key/value mapping that nodes progressively
//! merge partial updates into. Every merge is recorded in an append-only
//! change history, so a finished run can be audited step by step.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

/// Type alias for the raw state mapping. Insertion order is preserved.
pub type StateData = IndexMap<String, Value>;

/// How a node's result was folded into the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Every written key was new.
    Update,

    /// At least one written key replaced a pre-existing value.
    Merge,

    /// The node returned no update; nothing was written.
    Skip,
}

/// One entry in the change history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateChange {
    /// Name of the node whose result produced this change.
    pub node: String,

    /// Kind of change that was applied.
    pub kind: ChangeKind,

    /// Keys written by this change. Empty for `Skip`.
    pub keys_changed: BTreeSet<String>,

    /// When the change was recorded.
    pub timestamp: DateTime<Utc>,
}

/// The state of a graph execution: current values plus the change log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphState {
    /// Current state values, in insertion order.
    pub values: StateData,

    /// Append-only change history (most runs stay small).
    pub history: SmallVec<[StateChange; 8]>,
}

impl GraphState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self {
            values: StateData::new(),
            history: SmallVec::new(),
        }
    }

    /// Create a state seeded with initial data and an empty history.
    pub fn from_data(values: StateData) -> Self {
        Self {
            values,
            history: SmallVec::new(),
        }
    }

    /// Rebuild a state from a checkpointed snapshot and its history.
    pub fn from_parts(values: StateData, history: impl IntoIterator<Item = StateChange>) -> Self {
        Self {
            values,
            history: history.into_iter().collect(),
        }
    }

    /// Get a value by key.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Get a value by key, falling back to a default.
    #[inline]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.values.get(key).unwrap_or(default)
    }

    /// Set a single value. Later writes for the same key overwrite.
    #[inline]
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Whether a key is present.
    #[inline]
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Merge a partial update produced by `node` into the state, shallow and
    /// key-wise, and record the change. A `None` or empty partial writes
    /// nothing and is recorded as [`ChangeKind::Skip`].
    pub fn merge(&mut self, node: &str, partial: Option<StateData>) -> ChangeKind {
        match partial {
            Some(update) if !update.is_empty() => {
                let mut keys_changed = BTreeSet::new();
                let mut replaced = false;
                for (key, value) in update {
                    if self.values.contains_key(&key) {
                        replaced = true;
                    }
                    keys_changed.insert(key.clone());
                    self.values.insert(key, value);
                }
                let kind = if replaced {
                    ChangeKind::Merge
                } else {
                    ChangeKind::Update
                };
                self.record(node, kind, keys_changed);
                kind
            }
            _ => {
                self.record(node, ChangeKind::Skip, BTreeSet::new());
                ChangeKind::Skip
            }
        }
    }

    /// Immutable copy of the current values.
    pub fn snapshot(&self) -> StateData {
        self.values.clone()
    }

    /// The change log, oldest first.
    pub fn history(&self) -> &[StateChange] {
        &self.history
    }

    fn record(&mut self, node: &str, kind: ChangeKind, keys_changed: BTreeSet<String>) {
        self.history.push(StateChange {
            node: node.to_string(),
            kind,
            keys_changed,
            timestamp: Utc::now(),
        });
    }
}

impl Default for GraphState {
    fn default() -> Self {
        Self::new()
    }
}
