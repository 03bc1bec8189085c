//! Tool integration
//!
//! Tools are name-keyed callables that agents (or nodes) dispatch to through
//! a [`ToolRegistry`]. An unknown name fails with [`ToolError::NotFound`]; a
//! tool's own failure propagates unchanged so callers can branch on it.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

/// Errors related to tool dispatch and execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// No tool registered under this name.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// The tool rejected its parameters.
    #[error("Invalid parameters for tool '{tool}': {message}")]
    InvalidParameters { tool: String, message: String },

    /// The tool itself failed.
    #[error("Tool '{tool}' failed: {message}")]
    Failed { tool: String, message: String },
}

/// A named callable with JSON parameters and a JSON result.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the registry dispatches on.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str {
        ""
    }

    /// Run the tool.
    async fn execute(&self, params: Value) -> Result<Value, ToolError>;
}

/// Name-keyed registry of tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own name. Re-registering a name replaces
    /// the previous tool.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Look a tool up by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Dispatch to a tool by name.
    pub async fn execute(&self, name: &str, params: Value) -> Result<Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.execute(params).await
    }
}

/// Binary arithmetic over `{op, a, b}` parameters.
pub struct CalculatorTool;

impl CalculatorTool {
    fn number(params: &Value, field: &str) -> Result<f64, ToolError> {
        params
            .get(field)
            .and_then(Value::as_f64)
            .ok_or_else(|| ToolError::InvalidParameters {
                tool: "calculator".to_string(),
                message: format!("missing or non-numeric field '{field}'"),
            })
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Binary arithmetic: {op: add|sub|mul|div, a, b}"
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let a = Self::number(&params, "a")?;
        let b = Self::number(&params, "b")?;
        let op = params.get("op").and_then(Value::as_str).ok_or_else(|| {
            ToolError::InvalidParameters {
                tool: "calculator".to_string(),
                message: "missing field 'op'".to_string(),
            }
        })?;

        let result = match op {
            "add" => a + b,
            "sub" => a - b,
            "mul" => a * b,
            "div" => {
                if b == 0.0 {
                    return Err(ToolError::Failed {
                        tool: "calculator".to_string(),
                        message: "division by zero".to_string(),
                    });
                }
                a / b
            }
            other => {
                return Err(ToolError::InvalidParameters {
                    tool: "calculator".to_string(),
                    message: format!("unknown op '{other}'"),
                })
            }
        };

        Ok(Value::from(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(CalculatorTool));
        registry
    }

    #[tokio::test]
    async fn test_execute_known_tool() {
        let result = registry()
            .execute("calculator", json!({"op": "add", "a": 2, "b": 3}))
            .await
            .unwrap();
        assert_eq!(result, json!(5.0));
    }

    #[tokio::test]
    async fn test_unknown_tool_not_found() {
        let err = registry().execute("missing", json!({})).await.unwrap_err();
        assert_eq!(err, ToolError::NotFound("missing".to_string()));
    }

    #[tokio::test]
    async fn test_division_by_zero_fails() {
        let err = registry()
            .execute("calculator", json!({"op": "div", "a": 1, "b": 0}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Failed { .. }));
    }

    #[tokio::test]
    async fn test_bad_parameters_rejected() {
        let err = registry()
            .execute("calculator", json!({"op": "add", "a": "NaN-ish"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameters { .. }));
    }

    #[test]
    fn test_names_in_registration_order() {
        let registry = registry();
        assert_eq!(registry.names(), vec!["calculator"]);
    }
}
