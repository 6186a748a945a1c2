// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Set node (Edit Fields): build output items from selected input fields
//! plus assigned values

use flowroute_dsl::coercion::{coerce_to_type, preview};
use flowroute_dsl::{Assignment, IncludeFields, SetMode, SetParameters};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::expression::resolve;
use crate::item::{Item, NodeOutput};
use crate::paths::{get_field, remove_field, set_field};
use crate::types::{ExecutionContext, NodeError};

/// Run the Set node.
///
/// With `continue_on_fail`, an item that fails becomes `{"error": <message>}`.
pub fn execute(
    params: &SetParameters,
    ctx: &ExecutionContext,
    items: Vec<Item>,
) -> Result<NodeOutput, NodeError> {
    if let SetMode::Manual { assignments } = &params.mode
        && let Some(position) = assignments.iter().position(|a| a.name.trim().is_empty())
    {
        return Err(NodeError::configuration(
            "INVALID_ASSIGNMENT",
            format!("Assignment #{} has an empty field name", position),
        ));
    }

    let mut output = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match build_item(params, item, index) {
            Ok(json) => output.push(Item::paired(json, index)),
            Err(err) if ctx.continue_on_fail && err.is_item_error() => {
                warn!(node = %ctx.node_name, item = index, error = %err, "Set failed, emitting error item");
                output.push(Item::error(err.message, index));
            }
            Err(err) => return Err(err.with_item(index)),
        }
    }

    debug!(node = %ctx.node_name, items = output.len(), "Set built items");
    Ok(vec![output])
}

/// Output data for one item: the included base with new values on top.
fn build_item(params: &SetParameters, item: &Item, index: usize) -> Result<Map<String, Value>, NodeError> {
    let dot_notation = params.options.dot_notation;
    let mut json = base_fields(params, &item.json)?;

    match &params.mode {
        SetMode::Manual { assignments } => {
            for assignment in assignments {
                let value = assigned_value(
                    assignment,
                    item,
                    index,
                    params.options.ignore_conversion_errors,
                )?;
                set_field(&mut json, &assignment.name, value, dot_notation)?;
            }
        }
        SetMode::Raw { json_output } => {
            let fields = raw_object(resolve(json_output, item, index)?)?;
            for (key, value) in fields {
                set_field(&mut json, &key, value, dot_notation)?;
            }
        }
    }

    Ok(json)
}

fn base_fields(
    params: &SetParameters,
    input: &Map<String, Value>,
) -> Result<Map<String, Value>, NodeError> {
    if !params.include_other_fields {
        return Ok(Map::new());
    }
    let dot_notation = params.options.dot_notation;

    Ok(match &params.include {
        IncludeFields::All => input.clone(),
        IncludeFields::None => Map::new(),
        IncludeFields::Selected(fields) => {
            let mut base = Map::new();
            for field in fields.fields() {
                if let Some(value) = get_field(input, &field, dot_notation) {
                    set_field(&mut base, &field, value.clone(), dot_notation)?;
                }
            }
            base
        }
        IncludeFields::Except(fields) => {
            let mut base = input.clone();
            for field in fields.fields() {
                remove_field(&mut base, &field, dot_notation);
            }
            base
        }
    })
}

fn assigned_value(
    assignment: &Assignment,
    item: &Item,
    index: usize,
    ignore_conversion_errors: bool,
) -> Result<Value, NodeError> {
    let raw = resolve(&assignment.value, item, index)?;
    match coerce_to_type(&raw, assignment.field_type) {
        Ok(value) => Ok(value),
        Err(_) if ignore_conversion_errors => Ok(raw),
        Err(_) => Err(NodeError::item(
            "TYPE_CONVERSION_ERROR",
            format!(
                "'{}' expects a {} but we got '{}'",
                assignment.name,
                assignment.field_type,
                preview(&raw)
            ),
        )
        .with_attr("field", assignment.name.clone())),
    }
}

fn raw_object(value: Value) -> Result<Map<String, Value>, NodeError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Err(NodeError::item(
                "INVALID_JSON_OUTPUT",
                "'JSON Output' does not contain a valid JSON object",
            )),
        },
        other => Err(NodeError::item(
            "INVALID_JSON_OUTPUT",
            format!("'JSON Output' must be an object, got '{}'", preview(&other)),
        )),
    }
}
