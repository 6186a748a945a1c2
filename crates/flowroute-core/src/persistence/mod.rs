// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Persistence interfaces and backends for deduplication history.
//!
//! Backends only load, save and delete whole history records. The
//! check-and-record semantics live in [`crate::processed_data`].

pub mod memory;
pub mod sqlite;

pub use self::memory::MemoryHistoryStore;
pub use self::sqlite::SqliteHistoryStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Who shares a history: a single node, or the whole workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryContext {
    /// History private to one node.
    Node,
    /// History shared by all nodes of a workflow.
    Workflow,
}

impl HistoryContext {
    /// Context name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryContext::Node => "node",
            HistoryContext::Workflow => "workflow",
        }
    }
}

/// Identifies one history record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeKey {
    /// Node or workflow context.
    pub context: HistoryContext,
    /// Owning workflow.
    pub workflow_id: String,
    /// Owning node (empty for workflow scope).
    pub node_id: String,
}

impl ScopeKey {
    /// History private to `node_id` within `workflow_id`.
    pub fn node(workflow_id: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            context: HistoryContext::Node,
            workflow_id: workflow_id.into(),
            node_id: node_id.into(),
        }
    }

    /// History shared by every node of `workflow_id`.
    pub fn workflow(workflow_id: impl Into<String>) -> Self {
        Self {
            context: HistoryContext::Workflow,
            workflow_id: workflow_id.into(),
            node_id: String::new(),
        }
    }

    /// Check that the key identifies something.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.workflow_id.trim().is_empty() {
            return Err(CoreError::ValidationError {
                field: "workflow_id".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.context == HistoryContext::Node && self.node_id.trim().is_empty() {
            return Err(CoreError::ValidationError {
                field: "node_id".to_string(),
                message: "must not be empty for node-scoped history".to_string(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.context {
            HistoryContext::Node => write!(f, "node {}/{}", self.workflow_id, self.node_id),
            HistoryContext::Workflow => write!(f, "workflow {}", self.workflow_id),
        }
    }
}

/// How a history decides whether a value was processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HistoryMode {
    /// Every seen value is remembered (bounded).
    Entries,
    /// Only the highest numeric value is remembered.
    LatestIncrementalKey,
    /// Only the latest date is remembered.
    LatestDate,
}

impl HistoryMode {
    /// Mode name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryMode::Entries => "entries",
            HistoryMode::LatestIncrementalKey => "latestIncrementalKey",
            HistoryMode::LatestDate => "latestDate",
        }
    }
}

impl std::fmt::Display for HistoryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored history content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "data", rename_all = "camelCase")]
pub enum HistoryData {
    /// Digests of seen values, oldest first.
    Entries(Vec<String>),
    /// Highest numeric value seen.
    LatestIncrementalKey(f64),
    /// Latest date seen.
    LatestDate(DateTime<Utc>),
}

impl HistoryData {
    /// Mode that produced this data.
    pub fn mode(&self) -> HistoryMode {
        match self {
            HistoryData::Entries(_) => HistoryMode::Entries,
            HistoryData::LatestIncrementalKey(_) => HistoryMode::LatestIncrementalKey,
            HistoryData::LatestDate(_) => HistoryMode::LatestDate,
        }
    }

    /// Number of remembered values.
    pub fn len(&self) -> usize {
        match self {
            HistoryData::Entries(entries) => entries.len(),
            _ => 1,
        }
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A history record as loaded from a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    /// Record content.
    pub data: HistoryData,
    /// When the record was first written.
    pub created_at: DateTime<Utc>,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

/// Storage backend for history records.
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// Load the record of a scope, if any.
    async fn load(&self, scope: &ScopeKey) -> Result<Option<HistoryRecord>, CoreError>;

    /// Create or replace the record of a scope.
    async fn save(&self, scope: &ScopeKey, data: &HistoryData) -> Result<(), CoreError>;

    /// Delete the record of a scope. Returns whether a record existed.
    async fn delete(&self, scope: &ScopeKey) -> Result<bool, CoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scope_key_display_and_validation() {
        let node = ScopeKey::node("wf-1", "n-7");
        assert_eq!(node.to_string(), "node wf-1/n-7");
        assert!(node.validate().is_ok());

        let shared = ScopeKey::workflow("wf-1");
        assert_eq!(shared.to_string(), "workflow wf-1");
        assert_eq!(shared.node_id, "");
        assert!(shared.validate().is_ok());

        assert!(ScopeKey::node("wf-1", " ").validate().is_err());
        assert!(ScopeKey::workflow("").validate().is_err());
    }

    #[test]
    fn test_history_data_serialization() {
        let data = HistoryData::Entries(vec!["abc".to_string()]);
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({"mode": "entries", "data": ["abc"]})
        );

        let data = HistoryData::LatestIncrementalKey(42.0);
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["mode"], "latestIncrementalKey");
        let back: HistoryData = serde_json::from_value(value).unwrap();
        assert_eq!(back, data);
        assert_eq!(back.mode(), HistoryMode::LatestIncrementalKey);
    }

    #[test]
    fn test_history_data_len() {
        assert_eq!(HistoryData::Entries(vec![]).len(), 0);
        assert!(HistoryData::Entries(vec![]).is_empty());
        assert_eq!(HistoryData::LatestIncrementalKey(1.0).len(), 1);
        assert_eq!(HistoryData::LatestDate(Utc::now()).len(), 1);
    }

    #[test]
    fn test_mode_names_match_serde() {
        for mode in [
            HistoryMode::Entries,
            HistoryMode::LatestIncrementalKey,
            HistoryMode::LatestDate,
        ] {
            assert_eq!(serde_json::to_value(mode).unwrap(), json!(mode.as_str()));
        }
    }
}
