// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! RemoveDuplicates node
//!
//! Three operations:
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `removeDuplicateInputItems` | keep the first item of each comparison key within the input |
//! | `removeItemsRepeatedInPreviousExecutions` | keep items whose value is new to the persisted history |
//! | `clearDeduplicationHistory` | forget the persisted history, pass items through |

use std::collections::HashSet;
use std::sync::Arc;

use flowroute_core::time::from_epoch_millis;
use flowroute_core::{CoreError, HistoryMode, ProcessedDataManager, ScopeKey};
use flowroute_dsl::coercion::json_type_name;
use flowroute_dsl::{
    ClearHistoryConfig, CompareFields, DedupLogic, DedupScope, HistoryDedupConfig,
    InputDedupConfig, RemoveDuplicatesParameters,
};
use serde_json::{Map, Number, Value};
use tracing::{debug, info, warn};

use crate::expression::resolve;
use crate::item::{Item, NodeOutput};
use crate::paths::{get_field, remove_field, set_field};
use crate::types::{ExecutionContext, NodeError};

/// Run the RemoveDuplicates node.
pub async fn execute(
    params: &RemoveDuplicatesParameters,
    ctx: &ExecutionContext,
    items: Vec<Item>,
) -> Result<NodeOutput, NodeError> {
    match params {
        RemoveDuplicatesParameters::RemoveDuplicateInputItems(config) => {
            remove_input_duplicates(config, ctx, items)
        }
        RemoveDuplicatesParameters::RemoveItemsRepeatedInPreviousExecutions(config) => {
            remove_seen_in_history(config, ctx, items).await
        }
        RemoveDuplicatesParameters::ClearDeduplicationHistory(config) => {
            clear_history(config, ctx, items).await
        }
    }
}

// ============================================================================
// Input deduplication
// ============================================================================

/// Serialize a value with object keys sorted, so equal data gives equal keys.
fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let fields: Vec<String> = keys
                .into_iter()
                .map(|k| format!("{}:{}", Value::String(k.clone()), canonical_json(&map[k])))
                .collect();
            format!("{{{}}}", fields.join(","))
        }
        Value::Array(values) => {
            let elements: Vec<String> = values.iter().map(canonical_json).collect();
            format!("[{}]", elements.join(","))
        }
        Value::Number(n) => canonical_number(n),
        other => other.to_string(),
    }
}

/// Integral floats print as integers, so `1` and `1.0` give the same key.
fn canonical_number(n: &Number) -> String {
    if n.is_f64()
        && let Some(f) = n.as_f64()
        && f.fract() == 0.0
        && f.abs() < 9_007_199_254_740_992.0
    {
        return (f as i64).to_string();
    }
    n.to_string()
}

/// Fail when a field holds non-null values of different JSON types.
fn check_consistent_types<'a>(
    field: &str,
    values: impl Iterator<Item = (usize, Option<&'a Value>)>,
) -> Result<(), NodeError> {
    let mut seen: Option<&'static str> = None;
    for (index, value) in values {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            continue;
        };
        let type_name = json_type_name(value);
        match seen {
            None => seen = Some(type_name),
            Some(first) if first != type_name => {
                return Err(NodeError::item(
                    "INCONSISTENT_FIELD_TYPE",
                    format!("'{}' isn't always the same type", field),
                )
                .with_item(index)
                .with_attr("field", field));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn top_level_keys(items: &[Map<String, Value>]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for item in items {
        for key in item.keys() {
            if seen.insert(key.clone()) {
                keys.push(key.clone());
            }
        }
    }
    keys
}

fn remove_input_duplicates(
    config: &InputDedupConfig,
    ctx: &ExecutionContext,
    items: Vec<Item>,
) -> Result<NodeOutput, NodeError> {
    let dot_notation = !config.options.disable_dot_notation;
    let total = items.len();

    // Data each item is compared on.
    let compared: Vec<Map<String, Value>> = match &config.compare {
        CompareFields::AllFields => items.iter().map(|item| item.json.clone()).collect(),
        CompareFields::AllFieldsExcept(fields) => {
            let excluded = fields.fields();
            items
                .iter()
                .map(|item| {
                    let mut json = item.json.clone();
                    for field in &excluded {
                        remove_field(&mut json, field, dot_notation);
                    }
                    json
                })
                .collect()
        }
        CompareFields::SelectedFields(fields) => {
            let selected = fields.fields();
            if selected.is_empty() {
                return Err(NodeError::configuration(
                    "NO_FIELDS_SELECTED",
                    "Select at least one field to compare",
                ));
            }
            for field in &selected {
                if !items.is_empty()
                    && items
                        .iter()
                        .all(|item| get_field(&item.json, field, dot_notation).is_none())
                {
                    return Err(NodeError::configuration(
                        "FIELD_MISSING",
                        format!("'{}' field is missing from all input items", field),
                    )
                    .with_attr("field", field.clone()));
                }
            }
            items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    let mut json = Map::new();
                    for field in &selected {
                        if let Some(value) = get_field(&item.json, field, dot_notation) {
                            set_field(&mut json, field, value.clone(), dot_notation)
                                .map_err(|err| err.with_item(index))?;
                        }
                    }
                    Ok(json)
                })
                .collect::<Result<Vec<_>, NodeError>>()?
        }
    };

    match &config.compare {
        CompareFields::SelectedFields(fields) => {
            for field in fields.fields() {
                check_consistent_types(
                    &field,
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| (i, get_field(&item.json, &field, dot_notation))),
                )?;
            }
        }
        _ => {
            for key in top_level_keys(&compared) {
                check_consistent_types(
                    &key,
                    compared.iter().enumerate().map(|(i, json)| (i, json.get(&key))),
                )?;
            }
        }
    }

    let keep_only_compared = config.options.remove_other_fields
        && matches!(config.compare, CompareFields::SelectedFields(_));

    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    for (index, (item, compared)) in items.into_iter().zip(compared).enumerate() {
        let key = canonical_json(&Value::Object(compared.clone()));
        if !seen.insert(key) {
            continue;
        }
        let json = if keep_only_compared { compared } else { item.json };
        kept.push(Item::paired(json, index));
    }

    debug!(
        node = %ctx.node_name,
        input = total,
        kept = kept.len(),
        "Removed duplicate input items"
    );
    Ok(vec![kept])
}

// ============================================================================
// History deduplication
// ============================================================================

fn history_manager(ctx: &ExecutionContext) -> Result<Arc<ProcessedDataManager>, NodeError> {
    ctx.history.clone().ok_or_else(|| {
        NodeError::configuration(
            "HISTORY_UNAVAILABLE",
            "No deduplication history is configured for this execution",
        )
    })
}

fn scope_key(ctx: &ExecutionContext, scope: DedupScope) -> ScopeKey {
    match scope {
        DedupScope::Node => ScopeKey::node(ctx.workflow_id.clone(), ctx.node_id.clone()),
        DedupScope::Workflow => ScopeKey::workflow(ctx.workflow_id.clone()),
    }
}

fn history_mode(logic: DedupLogic) -> HistoryMode {
    match logic {
        DedupLogic::RemoveItemsWithAlreadySeenKeyValues => HistoryMode::Entries,
        DedupLogic::RemoveItemsUpToStoredIncrementalKey => HistoryMode::LatestIncrementalKey,
        DedupLogic::RemoveItemsUpToStoredDate => HistoryMode::LatestDate,
    }
}

/// String form of a dedupe value as handed to the history.
fn history_value(value: &Value, mode: HistoryMode) -> Option<String> {
    match (value, mode) {
        (Value::Null, _) => None,
        (Value::String(s), _) => Some(s.clone()),
        (Value::Number(n), HistoryMode::LatestDate) => n
            .as_f64()
            .and_then(from_epoch_millis)
            .map(|d| d.to_rfc3339())
            .or_else(|| Some(n.to_string())),
        (other, _) => Some(canonical_json(other)),
    }
}

async fn remove_seen_in_history(
    config: &HistoryDedupConfig,
    ctx: &ExecutionContext,
    items: Vec<Item>,
) -> Result<NodeOutput, NodeError> {
    let manager = history_manager(ctx)?;
    let scope = scope_key(ctx, config.options.scope);
    let mode = history_mode(config.logic);
    let max_entries = config
        .options
        .history_size
        .unwrap_or(ctx.default_history_size);
    if max_entries == 0 {
        return Err(NodeError::configuration(
            "INVALID_HISTORY_SIZE",
            "History size must be at least 1",
        ));
    }

    // Input positions and values taking part in the history check.
    let mut positions = Vec::with_capacity(items.len());
    let mut values = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let resolved = resolve(&config.dedupe_value, item, index).map_err(NodeError::from);
        let value = resolved.and_then(|v| {
            history_value(&v, mode).ok_or_else(|| {
                NodeError::item(
                    "EMPTY_DEDUPE_VALUE",
                    "The value to deduplicate on is empty",
                )
            })
        });
        match value {
            Ok(value) => {
                positions.push(index);
                values.push(value);
            }
            Err(err) if ctx.continue_on_fail && err.is_item_error() => {
                warn!(node = %ctx.node_name, item = index, error = %err, "Skipping item");
            }
            Err(err) => return Err(err.with_item(index)),
        }
    }

    let check = loop {
        match manager
            .check_processed_and_record(&scope, mode, &values, max_entries)
            .await
        {
            Ok(check) => break check,
            Err(CoreError::InvalidValue { index, .. })
                if ctx.continue_on_fail && index < values.len() =>
            {
                warn!(
                    node = %ctx.node_name,
                    item = positions[index],
                    value = %values[index],
                    "Skipping item with unusable dedupe value"
                );
                positions.remove(index);
                values.remove(index);
            }
            Err(err) => {
                let err = NodeError::from(err);
                return Err(match err.item_index {
                    Some(batch_index) if batch_index < positions.len() => {
                        err.with_item(positions[batch_index])
                    }
                    _ => err,
                });
            }
        }
    };

    let keep: HashSet<usize> = check.new.iter().map(|&i| positions[i]).collect();
    let total = items.len();
    let kept: Vec<Item> = items
        .into_iter()
        .enumerate()
        .filter(|(index, _)| keep.contains(index))
        .map(|(index, item)| Item::paired(item.json, index))
        .collect();

    info!(
        node = %ctx.node_name,
        scope = %scope,
        mode = %mode,
        input = total,
        kept = kept.len(),
        "Removed items seen in previous executions"
    );
    Ok(vec![kept])
}

async fn clear_history(
    config: &ClearHistoryConfig,
    ctx: &ExecutionContext,
    items: Vec<Item>,
) -> Result<NodeOutput, NodeError> {
    let manager = history_manager(ctx)?;
    let scope = scope_key(ctx, config.options.scope);
    manager.clear_all_processed_items(&scope).await?;

    Ok(vec![
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| Item::paired(item.json, index))
            .collect(),
    ])
}
