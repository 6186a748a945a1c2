// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Filter node: keep items matching the conditions

use flowroute_dsl::FilterParameters;
use tracing::{debug, warn};

use crate::conditions::{evaluate_group, validate_group};
use crate::item::{Item, NodeOutput};
use crate::types::{ExecutionContext, NodeError};

/// Run the Filter node.
///
/// Returns `[kept]`, or `[kept, discarded]` when `always_output_discarded`
/// is set. With `continue_on_fail`, an item that fails evaluation is
/// discarded.
pub fn execute(
    params: &FilterParameters,
    ctx: &ExecutionContext,
    items: Vec<Item>,
) -> Result<NodeOutput, NodeError> {
    validate_group(&params.conditions)?;
    let options = params
        .conditions
        .effective_options(params.ignore_case, params.loose_type_validation);

    let mut kept = Vec::new();
    let mut discarded = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        match evaluate_group(&params.conditions, options, &item, index) {
            Ok(true) => kept.push(Item::paired(item.json, index)),
            Ok(false) => discarded.push(Item::paired(item.json, index)),
            Err(err) if ctx.continue_on_fail && err.is_item_error() => {
                warn!(node = %ctx.node_name, item = index, error = %err, "Condition failed, discarding item");
                discarded.push(Item::paired(item.json, index));
            }
            Err(err) => return Err(err.with_item(index)),
        }
    }

    debug!(
        node = %ctx.node_name,
        kept = kept.len(),
        discarded = discarded.len(),
        "Filter evaluated"
    );

    if params.always_output_discarded {
        Ok(vec![kept, discarded])
    } else {
        Ok(vec![kept])
    }
}
