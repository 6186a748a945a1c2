// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Switch node: route each item to one of several outputs
//!
//! In `rules` mode the rules are checked in order and the item goes to the
//! first matching rule's output (or to every matching output). In
//! `expression` mode a parameter value computes the output index directly.

use flowroute_dsl::coercion::preview;
use flowroute_dsl::{FallbackOutput, SwitchExpressionConfig, SwitchParameters, SwitchRulesConfig};
use serde_json::Value;
use tracing::{debug, warn};

use crate::conditions::{evaluate_group, validate_group};
use crate::expression::resolve;
use crate::item::{Item, NodeOutput};
use crate::types::{ExecutionContext, NodeError};

/// Run the Switch node.
///
/// With `continue_on_fail`, an item that fails is emitted on output 0 as
/// `{"error": <message>}`.
pub fn execute(
    params: &SwitchParameters,
    ctx: &ExecutionContext,
    items: Vec<Item>,
) -> Result<NodeOutput, NodeError> {
    let output = match params {
        SwitchParameters::Rules(config) => execute_rules(config, ctx, items)?,
        SwitchParameters::Expression(config) => execute_expression(config, ctx, items)?,
    };

    debug!(
        node = %ctx.node_name,
        outputs = ?output.iter().map(Vec::len).collect::<Vec<_>>(),
        "Switch routed items"
    );
    Ok(output)
}

fn recover(
    ctx: &ExecutionContext,
    outputs: &mut NodeOutput,
    err: NodeError,
    index: usize,
) -> Result<(), NodeError> {
    if !(ctx.continue_on_fail && err.is_item_error()) {
        return Err(err.with_item(index));
    }
    warn!(node = %ctx.node_name, item = index, error = %err, "Routing failed, emitting error item");
    if let Some(first) = outputs.first_mut() {
        first.push(Item::error(err.message, index));
    }
    Ok(())
}

fn execute_rules(
    config: &SwitchRulesConfig,
    ctx: &ExecutionContext,
    items: Vec<Item>,
) -> Result<NodeOutput, NodeError> {
    config
        .validate()
        .map_err(|message| NodeError::configuration("INVALID_SWITCH_RULES", message))?;
    for rule in &config.rules {
        validate_group(&rule.conditions)?;
    }

    let options = &config.options;
    let mut outputs: NodeOutput = vec![Vec::new(); config.output_count()];

    'items: for (index, item) in items.into_iter().enumerate() {
        let mut matched = false;

        for (rule_index, rule) in config.rules.iter().enumerate() {
            let rule_options = rule
                .conditions
                .effective_options(options.ignore_case, options.loose_type_validation);
            match evaluate_group(&rule.conditions, rule_options, &item, index) {
                Ok(true) => {
                    matched = true;
                    outputs[rule_index].push(Item::paired(item.json.clone(), index));
                    if !options.all_matching_outputs {
                        break;
                    }
                }
                Ok(false) => {}
                Err(err) => {
                    recover(
                        ctx,
                        &mut outputs,
                        err.with_attr("rule", rule_index.to_string()),
                        index,
                    )?;
                    continue 'items;
                }
            }
        }

        if matched {
            continue;
        }
        match options.fallback_output {
            FallbackOutput::None => {}
            FallbackOutput::Extra => outputs[config.rules.len()].push(Item::paired(item.json, index)),
            FallbackOutput::Output(target) => outputs[target].push(Item::paired(item.json, index)),
        }
    }

    Ok(outputs)
}

/// Read a resolved value as an output index in `0..number_outputs`.
fn output_index(value: &Value, number_outputs: usize) -> Result<usize, NodeError> {
    let candidate = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    match candidate.and_then(|i| usize::try_from(i).ok()) {
        Some(index) if index < number_outputs => Ok(index),
        _ => Err(NodeError::item(
            "INVALID_OUTPUT_INDEX",
            format!(
                "The output {} is not allowed. It has to be between 0 and {}",
                preview(value),
                number_outputs.saturating_sub(1)
            ),
        )),
    }
}

fn execute_expression(
    config: &SwitchExpressionConfig,
    ctx: &ExecutionContext,
    items: Vec<Item>,
) -> Result<NodeOutput, NodeError> {
    if config.number_outputs == 0 {
        return Err(NodeError::configuration(
            "INVALID_SWITCH_OUTPUTS",
            "Switch needs at least one output",
        ));
    }

    let mut outputs: NodeOutput = vec![Vec::new(); config.number_outputs];

    for (index, item) in items.into_iter().enumerate() {
        let routed = resolve(&config.output, &item, index)
            .map_err(NodeError::from)
            .and_then(|value| output_index(&value, config.number_outputs));
        match routed {
            Ok(target) => outputs[target].push(Item::paired(item.json, index)),
            Err(err) => recover(ctx, &mut outputs, err, index)?,
        }
    }

    Ok(outputs)
}
