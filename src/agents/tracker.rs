//! Execution tracking for nodes and agents
//!
//! A caller-supplied log of what ran and when. The engine records one entry
//! per action when a tracker is passed in the execution options; agents can
//! log through the same instance.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

/// One tracked step.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    /// Node or agent name.
    pub actor: String,

    /// What happened: `invoke`, `merge`, `interrupt`, `finish`, or any
    /// caller-defined action.
    pub action: String,

    /// Structured details for the action.
    pub details: Value,

    pub timestamp: DateTime<Utc>,
}

/// Aggregate view over the tracked log.
#[derive(Debug, Clone, Serialize)]
pub struct TrackerStats {
    /// Total tracked steps.
    pub step_count: usize,

    /// Steps per actor.
    pub per_actor: BTreeMap<String, usize>,

    /// Milliseconds since the tracker was created.
    pub elapsed_ms: u128,
}

/// Shareable, thread-safe execution log.
pub struct ExecutionTracker {
    started: Instant,
    log: Mutex<Vec<StepRecord>>,
}

impl ExecutionTracker {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Record one step.
    pub fn log_step(&self, actor: &str, action: &str, details: Value) {
        self.log.lock().push(StepRecord {
            actor: actor.to_string(),
            action: action.to_string(),
            details,
            timestamp: Utc::now(),
        });
    }

    /// Copy of the log, oldest first.
    pub fn log(&self) -> Vec<StepRecord> {
        self.log.lock().clone()
    }

    /// Aggregate counts over the log.
    pub fn stats(&self) -> TrackerStats {
        let log = self.log.lock();
        let mut per_actor = BTreeMap::new();
        for record in log.iter() {
            *per_actor.entry(record.actor.clone()).or_insert(0) += 1;
        }
        TrackerStats {
            step_count: log.len(),
            per_actor,
            elapsed_ms: self.started.elapsed().as_millis(),
        }
    }
}

impl Default for ExecutionTracker {
    fn default() -> Self {
        Self::new()
    }
}
