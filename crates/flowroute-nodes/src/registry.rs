// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Node dispatch
//!
//! Looks up the interpreter for a node's type and runs it on a batch of items.

use flowroute_dsl::{Node, NodeKind};
use serde_json::{Map, Value};
use tracing::{Instrument, info, info_span};

use crate::item::{Item, NodeOutput};
use crate::types::{ExecutionContext, NodeError};
use crate::{filter, if_node, remove_duplicates, set, switch};

/// Execute a node on its input items.
///
/// # Arguments
/// * `node` - The node definition
/// * `ctx` - Workflow/node identity, error handling and history
/// * `items` - Input items, in order
///
/// # Returns
/// One item list per output port, in the order of [`Node::output_names`].
pub async fn execute_node(
    node: &Node,
    ctx: &ExecutionContext,
    items: Vec<Item>,
) -> Result<NodeOutput, NodeError> {
    node.validate()
        .map_err(|message| NodeError::configuration("INVALID_PARAMETERS", message))?;

    let span = info_span!(
        "node",
        node_id = %node.id,
        node_name = %node.name,
        node_type = node.kind.type_name(),
        workflow_id = %ctx.workflow_id,
    );

    async move {
        let input = items.len();
        let output = match &node.kind {
            NodeKind::If(params) => if_node::execute(params, ctx, items),
            NodeKind::Filter(params) => filter::execute(params, ctx, items),
            NodeKind::Switch(params) => switch::execute(params, ctx, items),
            NodeKind::Set(params) => set::execute(params, ctx, items),
            NodeKind::RemoveDuplicates(params) => {
                remove_duplicates::execute(params, ctx, items).await
            }
        }?;

        info!(
            input,
            outputs = ?output.iter().map(Vec::len).collect::<Vec<_>>(),
            "Node executed"
        );
        Ok(output)
    }
    .instrument(span)
    .await
}

/// Key the output of `node` by port label.
///
/// Repeated labels (two Switch rules with the same output key) get a
/// numeric suffix: `"a"`, `"a_1"`.
pub fn outputs_by_name(node: &Node, output: &NodeOutput) -> Map<String, Value> {
    let mut names = node.output_names();
    while names.len() < output.len() {
        names.push(names.len().to_string());
    }

    let mut result = Map::new();
    for (name, items) in names.into_iter().zip(output) {
        let mut key = name.clone();
        let mut suffix = 1;
        while result.contains_key(&key) {
            key = format!("{}_{}", name, suffix);
            suffix += 1;
        }
        result.insert(
            key,
            Value::Array(items.iter().map(Item::to_envelope).collect()),
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::items_from_value;
    use flowroute_dsl::parse_node;
    use serde_json::json;

    fn switch_node() -> Node {
        parse_node(&json!({
            "id": "sw",
            "name": "Route",
            "type": "Switch",
            "parameters": {
                "mode": "rules",
                "rules": [
                    {
                        "outputKey": "small",
                        "conditions": {"conditions": [{
                            "leftValue": {"valueType": "reference", "value": "n"},
                            "rightValue": {"valueType": "immediate", "value": 10},
                            "operator": {"type": "number", "operation": "lt"}
                        }]}
                    },
                    {
                        "outputKey": "small",
                        "conditions": {"conditions": [{
                            "leftValue": {"valueType": "reference", "value": "n"},
                            "rightValue": {"valueType": "immediate", "value": 100},
                            "operator": {"type": "number", "operation": "lt"}
                        }]}
                    }
                ],
                "options": {"fallbackOutput": "extra"}
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_execute_node_dispatches() {
        let node = switch_node();
        let ctx = ExecutionContext::new("wf", &node);
        let output = execute_node(
            &node,
            &ctx,
            items_from_value(json!([{"n": 1}, {"n": 50}, {"n": 500}])),
        )
        .await
        .unwrap();
        assert_eq!(output.iter().map(Vec::len).collect::<Vec<_>>(), vec![1, 1, 1]);

        let named = outputs_by_name(&node, &output);
        let keys: Vec<&String> = named.keys().collect();
        assert_eq!(named.len(), 3);
        assert!(keys.contains(&&"small".to_string()));
        assert!(keys.contains(&&"small_1".to_string()));
        assert_eq!(named["Fallback"], json!([{"json": {"n": 500}, "pairedItem": {"item": 2}}]));
    }

    #[tokio::test]
    async fn test_execute_node_rejects_invalid_parameters() {
        let node = parse_node(&json!({
            "id": "sw",
            "name": "Route",
            "type": "Switch",
            "parameters": {"mode": "expression", "numberOutputs": 0, "output": {"valueType": "immediate", "value": 0}}
        }))
        .unwrap();
        let ctx = ExecutionContext::new("wf", &node);
        let err = execute_node(&node, &ctx, Vec::new()).await.unwrap_err();
        assert_eq!(err.code, "INVALID_PARAMETERS");
    }
}
