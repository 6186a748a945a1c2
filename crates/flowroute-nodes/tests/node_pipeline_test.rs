// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Nodes chained through `execute_node`, with history kept in SQLite.

use std::sync::Arc;

use flowroute_core::{ProcessedDataManager, SqliteHistoryStore};
use flowroute_dsl::{Node, parse_node};
use flowroute_nodes::{ErrorCategory, ExecutionContext, Item, execute_node, items_from_value};
use serde_json::{Value, json};
use tempfile::TempDir;

async fn history(dir: &TempDir) -> Arc<ProcessedDataManager> {
    let store = SqliteHistoryStore::from_path(dir.path().join("history.db"))
        .await
        .expect("open sqlite store");
    Arc::new(ProcessedDataManager::new(Arc::new(store)))
}

fn node(value: Value) -> Node {
    parse_node(&value).expect("valid node")
}

fn values(items: &[Item]) -> Vec<Value> {
    items.iter().map(Item::to_value).collect()
}

fn new_orders_node() -> Node {
    node(json!({
        "id": "new-orders",
        "name": "New orders only",
        "type": "RemoveDuplicates",
        "parameters": {
            "operation": "removeItemsRepeatedInPreviousExecutions",
            "logic": "removeItemsWithAlreadySeenKeyValues",
            "dedupeValue": {"valueType": "template", "value": "{{ json.shop }}-{{ json.id }}"}
        }
    }))
}

#[tokio::test]
async fn filter_then_dedupe_across_runs() {
    let dir = TempDir::new().unwrap();
    let history = history(&dir).await;

    let paid = node(json!({
        "id": "paid",
        "name": "Paid",
        "type": "Filter",
        "parameters": {
            "conditions": {"conditions": [{
                "leftValue": {"valueType": "reference", "value": "status"},
                "rightValue": {"valueType": "immediate", "value": "paid"},
                "operator": {"type": "string", "operation": "equals"}
            }]}
        }
    }));
    let dedupe = new_orders_node();

    let run = |input: Value| {
        let paid = paid.clone();
        let dedupe = dedupe.clone();
        let history = history.clone();
        async move {
            let filtered = execute_node(&paid, &ExecutionContext::new("orders", &paid), items_from_value(input))
                .await
                .unwrap();
            let ctx = ExecutionContext::new("orders", &dedupe).with_history(history);
            let kept = filtered.into_iter().next().unwrap();
            execute_node(&dedupe, &ctx, kept).await.unwrap().remove(0)
        }
    };

    let first = run(json!([
        {"shop": "a", "id": 1, "status": "paid"},
        {"shop": "a", "id": 2, "status": "open"},
        {"shop": "b", "id": 1, "status": "paid"}
    ]))
    .await;
    assert_eq!(first.len(), 2);

    let second = run(json!([
        {"shop": "a", "id": 1, "status": "paid"},
        {"shop": "a", "id": 2, "status": "paid"}
    ]))
    .await;
    assert_eq!(values(&second), vec![json!({"shop": "a", "id": 2, "status": "paid"})]);
}

#[tokio::test]
async fn history_persists_in_database_file() {
    let dir = TempDir::new().unwrap();
    let dedupe = new_orders_node();
    let input = json!([{"shop": "a", "id": 1}]);

    let ctx = ExecutionContext::new("orders", &dedupe).with_history(history(&dir).await);
    let out = execute_node(&dedupe, &ctx, items_from_value(input.clone())).await.unwrap();
    assert_eq!(out[0].len(), 1);

    // A fresh manager over the same file sees the recorded value.
    let ctx = ExecutionContext::new("orders", &dedupe).with_history(history(&dir).await);
    let out = execute_node(&dedupe, &ctx, items_from_value(input)).await.unwrap();
    assert!(out[0].is_empty());
}

#[tokio::test]
async fn set_then_switch_by_expression() {
    let set = node(json!({
        "id": "bucket",
        "name": "Bucket",
        "type": "Set",
        "parameters": {
            "mode": "manual",
            "assignments": [{
                "name": "bucket",
                "type": "number",
                "value": {"valueType": "template", "value": "{{ 0 if json.total < 100 else 1 }}"}
            }],
            "includeOtherFields": true
        }
    }));
    let switch = node(json!({
        "id": "route",
        "name": "Route",
        "type": "Switch",
        "parameters": {
            "mode": "expression",
            "numberOutputs": 2,
            "output": {"valueType": "reference", "value": "bucket"}
        }
    }));

    let items = items_from_value(json!([{"total": 20}, {"total": 250}, {"total": 99}]));
    let with_bucket = execute_node(&set, &ExecutionContext::new("wf", &set), items)
        .await
        .unwrap()
        .remove(0);
    assert_eq!(with_bucket[1].json["bucket"], json!(1));

    let routed = execute_node(&switch, &ExecutionContext::new("wf", &switch), with_bucket)
        .await
        .unwrap();
    assert_eq!(routed[0].len(), 2);
    assert_eq!(routed[1].len(), 1);
    assert_eq!(routed[1][0].paired_item.unwrap().item, 1);
}

#[tokio::test]
async fn history_operation_without_history_is_configuration_error() {
    let dedupe = new_orders_node();
    let ctx = ExecutionContext::new("orders", &dedupe).with_continue_on_fail(true);
    let err = execute_node(&dedupe, &ctx, items_from_value(json!([{"id": 1}])))
        .await
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::Configuration);
    assert_eq!(err.code, "HISTORY_UNAVAILABLE");
}
