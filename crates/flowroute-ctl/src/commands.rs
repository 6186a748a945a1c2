// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Command implementations, independent of argument parsing.

use std::path::Path;
use std::sync::Arc;

use flowroute_core::{
    Config, MemoryHistoryStore, ProcessedDataManager, ScopeKey, SqliteHistoryStore,
};
use flowroute_dsl::{DedupScope, Node, parse_node};
use flowroute_nodes::{ExecutionContext, Item, execute_node, items_from_value, outputs_by_name};
use serde_json::{Value, json};
use tracing::info;

use crate::error::{CtlError, Result};

/// Options of the `run` command.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Workflow the node runs in
    pub workflow_id: String,
    /// Overrides the node's own id for history scoping
    pub node_id: Option<String>,
    /// Overrides the node's `continueOnFail`
    pub continue_on_fail: bool,
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| CtlError::Io {
        path: path.display().to_string(),
        details: e.to_string(),
    })
}

/// Load a node definition from a JSON file.
pub fn load_node(path: &Path) -> Result<Node> {
    let value: Value = serde_json::from_str(&read_file(path)?)?;
    parse_node(&value).map_err(CtlError::InvalidInput)
}

/// Parse input items from JSON text.
pub fn parse_items(text: &str) -> Result<Vec<Item>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(text)?;
    Ok(items_from_value(value))
}

/// Open the history configured by `config`, or a throwaway in-memory one.
pub async fn open_history(config: &Config, memory: bool) -> Result<Arc<ProcessedDataManager>> {
    if memory {
        return Ok(Arc::new(ProcessedDataManager::new(Arc::new(
            MemoryHistoryStore::new(),
        ))));
    }

    std::fs::create_dir_all(&config.data_dir).map_err(|e| CtlError::Io {
        path: config.data_dir.display().to_string(),
        details: e.to_string(),
    })?;
    let store = SqliteHistoryStore::connect(&config.database_url).await?;
    info!(database_url = %config.database_url, "Opened deduplication history");
    Ok(Arc::new(ProcessedDataManager::new(Arc::new(store))))
}

/// Run one node and key its outputs by port label.
pub async fn run_node(
    node: &Node,
    items: Vec<Item>,
    options: &RunOptions,
    history: Arc<ProcessedDataManager>,
    default_history_size: usize,
) -> Result<Value> {
    let mut ctx = ExecutionContext::new(options.workflow_id.clone(), node)
        .with_history(history)
        .with_default_history_size(default_history_size);
    if let Some(node_id) = &options.node_id {
        ctx.node_id = node_id.clone();
    }
    if options.continue_on_fail {
        ctx.continue_on_fail = true;
    }

    let output = execute_node(node, &ctx, items).await?;
    Ok(json!({
        "node": node.name,
        "type": node.kind.type_name(),
        "outputs": outputs_by_name(node, &output),
    }))
}

/// History key for the `history` commands.
pub fn scope_key(scope: DedupScope, workflow_id: &str, node_id: Option<&str>) -> Result<ScopeKey> {
    match (scope, node_id) {
        (DedupScope::Workflow, _) => Ok(ScopeKey::workflow(workflow_id)),
        (DedupScope::Node, Some(node_id)) => Ok(ScopeKey::node(workflow_id, node_id)),
        (DedupScope::Node, None) => Err(CtlError::InvalidInput(
            "--node-id is required for node scope".to_string(),
        )),
    }
}

/// Number of remembered values of a history.
pub async fn history_count(history: &ProcessedDataManager, scope: &ScopeKey) -> Result<Value> {
    let count = history.processed_count(scope).await?;
    Ok(json!({ "scope": scope.to_string(), "count": count }))
}

/// Forget a whole history.
pub async fn history_clear(history: &ProcessedDataManager, scope: &ScopeKey) -> Result<Value> {
    history.clear_all_processed_items(scope).await?;
    Ok(json!({ "scope": scope.to_string(), "cleared": true }))
}
