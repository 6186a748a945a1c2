// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! If node: route each item to the `true` or `false` output

use flowroute_dsl::IfParameters;
use tracing::{debug, warn};

use crate::conditions::{evaluate_group, validate_group};
use crate::item::{Item, NodeOutput};
use crate::types::{ExecutionContext, NodeError};

/// Run the If node.
///
/// With `continue_on_fail`, an item whose conditions fail to evaluate goes
/// to the `false` output.
pub fn execute(
    params: &IfParameters,
    ctx: &ExecutionContext,
    items: Vec<Item>,
) -> Result<NodeOutput, NodeError> {
    validate_group(&params.conditions)?;
    let options = params
        .conditions
        .effective_options(params.ignore_case, params.loose_type_validation);

    let mut true_items = Vec::new();
    let mut false_items = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        match evaluate_group(&params.conditions, options, &item, index) {
            Ok(true) => true_items.push(Item::paired(item.json, index)),
            Ok(false) => false_items.push(Item::paired(item.json, index)),
            Err(err) if ctx.continue_on_fail && err.is_item_error() => {
                warn!(node = %ctx.node_name, item = index, error = %err, "Condition failed, routing item to false");
                false_items.push(Item::paired(item.json, index));
            }
            Err(err) => return Err(err.with_item(index)),
        }
    }

    debug!(
        node = %ctx.node_name,
        true_count = true_items.len(),
        false_count = false_items.len(),
        "If evaluated"
    );
    Ok(vec![true_items, false_items])
}
