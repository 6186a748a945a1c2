// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared types used across nodes

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use flowroute_core::{CoreError, ProcessedDataManager};
use flowroute_dsl::coercion::CoercionError;
use flowroute_dsl::{DEFAULT_HISTORY_SIZE, Node};
use serde::{Deserialize, Serialize};

/// What went wrong, for routing and reporting decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Node parameters are invalid regardless of input.
    Configuration,
    /// A single item could not be processed.
    Item,
    /// The deduplication history rejected or failed an operation.
    History,
}

/// Structured error for node execution.
///
/// Item-level errors carry the index of the failing input item so that
/// `continue_on_fail` handling and reporting can point at it:
///
/// ```rust,ignore
/// NodeError::item("TYPE_VALIDATION_ERROR", "Wrong type: 'abc' is a string but was expecting a number")
///     .with_item(3)
///     .with_attr("condition", "0")
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeError {
    /// Machine-readable error code (e.g., "TYPE_VALIDATION_ERROR")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Error category
    pub category: ErrorCategory,

    /// Index of the failing input item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_index: Option<usize>,

    /// Additional context attributes
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
}

impl NodeError {
    /// Create a configuration error.
    pub fn configuration(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Configuration, code, message)
    }

    /// Create an item-level error.
    pub fn item(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Item, code, message)
    }

    /// Create a history error.
    pub fn history(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::History, code, message)
    }

    fn new(category: ErrorCategory, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            category,
            item_index: None,
            attributes: HashMap::new(),
        }
    }

    /// Attach the index of the failing item.
    pub fn with_item(mut self, index: usize) -> Self {
        self.item_index = Some(index);
        self
    }

    /// Add a context attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Whether `continue_on_fail` may recover from this error.
    pub fn is_item_error(&self) -> bool {
        self.category == ErrorCategory::Item
    }
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(index) = self.item_index {
            write!(f, " (item {})", index)?;
        }
        Ok(())
    }
}

impl std::error::Error for NodeError {}

impl From<CoreError> for NodeError {
    fn from(err: CoreError) -> Self {
        let error = NodeError::history(err.error_code(), err.to_string());
        match err.value_index() {
            Some(index) => error.with_item(index),
            None => error,
        }
    }
}

impl From<CoercionError> for NodeError {
    fn from(err: CoercionError) -> Self {
        NodeError::item("TYPE_VALIDATION_ERROR", err.to_string())
            .with_attr("expected_type", err.expected)
            .with_attr("actual_type", err.actual)
    }
}

/// Everything a node needs besides its parameters and input items.
#[derive(Clone)]
pub struct ExecutionContext {
    /// Workflow the node belongs to
    pub workflow_id: String,
    /// Node id, used to scope node-level history
    pub node_id: String,
    /// Node name, used in logs
    pub node_name: String,
    /// Recover from item-level errors instead of aborting
    pub continue_on_fail: bool,
    /// Deduplication history, required by history operations
    pub history: Option<Arc<ProcessedDataManager>>,
    /// History size used when a node does not set one
    pub default_history_size: usize,
}

impl ExecutionContext {
    /// Context for running `node` inside `workflow_id`, without history.
    pub fn new(workflow_id: impl Into<String>, node: &Node) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            node_id: node.id.clone(),
            node_name: node.name.clone(),
            continue_on_fail: node.continue_on_fail,
            history: None,
            default_history_size: DEFAULT_HISTORY_SIZE,
        }
    }

    /// Attach a deduplication history.
    pub fn with_history(mut self, history: Arc<ProcessedDataManager>) -> Self {
        self.history = Some(history);
        self
    }

    /// Override the default history size.
    pub fn with_default_history_size(mut self, size: usize) -> Self {
        self.default_history_size = size;
        self
    }

    /// Override `continue_on_fail`.
    pub fn with_continue_on_fail(mut self, continue_on_fail: bool) -> Self {
        self.continue_on_fail = continue_on_fail;
        self
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("workflow_id", &self.workflow_id)
            .field("node_id", &self.node_id)
            .field("node_name", &self.node_name)
            .field("continue_on_fail", &self.continue_on_fail)
            .field("history", &self.history.is_some())
            .field("default_history_size", &self.default_history_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_error_builders() {
        let err = NodeError::item("TYPE_VALIDATION_ERROR", "bad")
            .with_item(2)
            .with_attr("condition", "0");
        assert_eq!(err.category, ErrorCategory::Item);
        assert!(err.is_item_error());
        assert_eq!(err.item_index, Some(2));
        assert_eq!(err.attributes.get("condition"), Some(&"0".to_string()));
        assert_eq!(err.to_string(), "[TYPE_VALIDATION_ERROR] bad (item 2)");

        let err = NodeError::configuration("INVALID_CONDITION", "nope");
        assert!(!err.is_item_error());
        assert_eq!(err.to_string(), "[INVALID_CONDITION] nope");
    }

    #[test]
    fn test_node_error_serialization() {
        let err = NodeError::history("DATABASE_ERROR", "disk full");
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(
            value,
            json!({"code": "DATABASE_ERROR", "message": "disk full", "category": "history"})
        );
    }

    #[test]
    fn test_from_core_error_keeps_value_index() {
        let err: NodeError = CoreError::InvalidValue {
            mode: "latestIncrementalKey".to_string(),
            index: 4,
            value: "x".to_string(),
        }
        .into();
        assert_eq!(err.code, "INVALID_HISTORY_VALUE");
        assert_eq!(err.category, ErrorCategory::History);
        assert_eq!(err.item_index, Some(4));
    }

    #[test]
    fn test_from_coercion_error() {
        let err: NodeError = CoercionError::new(&json!("abc"), "number").into();
        assert_eq!(err.code, "TYPE_VALIDATION_ERROR");
        assert_eq!(
            err.message,
            "Wrong type: 'abc' is a string but was expecting a number"
        );
        assert_eq!(err.attributes.get("actual_type"), Some(&"string".to_string()));
    }
}
