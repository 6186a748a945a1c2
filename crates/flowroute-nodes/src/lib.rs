// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Nodes Library - Interpreters for routing, field editing and deduplication nodes
//!
//! Each node takes an ordered batch of [`Item`]s and returns one item list per
//! output port. Output items carry a `pairedItem` back-reference to the input
//! item they came from.
//!
//! | Node | Outputs |
//! |------|---------|
//! | `If` | `true`, `false` |
//! | `Filter` | `kept` (and `discarded` when requested) |
//! | `Switch` | one per rule, plus an optional fallback |
//! | `Set` | `main` |
//! | `RemoveDuplicates` | `main` |
//!
//! ```rust,ignore
//! let node = flowroute_dsl::parse_node(&definition)?;
//! let ctx = ExecutionContext::new("wf-1", &node).with_history(history);
//! let output = execute_node(&node, &ctx, items_from_value(input)).await?;
//! ```

// Node interpreters from nodes/ subdirectory
#[path = "nodes/filter.rs"]
pub mod filter;
#[path = "nodes/if_node.rs"]
pub mod if_node;
#[path = "nodes/remove_duplicates.rs"]
pub mod remove_duplicates;
#[path = "nodes/set.rs"]
pub mod set;
#[path = "nodes/switch.rs"]
pub mod switch;

// Shared types
pub mod item;
pub mod types;

// Field paths, mapping values and conditions
pub mod conditions;
pub mod expression;
pub mod paths;

// Dispatch by node type
pub mod registry;

pub use item::{Item, NodeOutput, PairedItem, items_from_value};
pub use registry::{execute_node, outputs_by_name};
pub use types::{ErrorCategory, ExecutionContext, NodeError};

pub use flowroute_core;
pub use flowroute_dsl;
