// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Node Definition Types - Single Source of Truth
//!
//! This crate defines the node definition types used throughout the codebase:
//! - Runtime deserialization of node JSON
//! - Type-safe access to node parameters in the executor
//! - Generation of JSON Schema via schemars
//!
//! Supported node types: `If`, `Filter`, `Switch`, `Set`, `RemoveDuplicates`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Include the schema types
include!("schema_types.rs");

// Data directory paths
pub mod paths;

// Type coercion used by loose type validation and typed assignments
pub mod coercion;

// JSON schema generation
pub mod spec;

/// Default number of values remembered by a deduplication history.
pub const DEFAULT_HISTORY_SIZE: usize = 10_000;

// ============================================================================
// Parsing Functions
// ============================================================================

/// Parse a node definition from JSON Value
pub fn parse_node(json: &serde_json::Value) -> Result<Node, String> {
    serde_json::from_value(json.clone()).map_err(|e| format!("Failed to parse node: {}", e))
}

// ============================================================================
// NodeKind Methods
// ============================================================================

impl NodeKind {
    /// Node type name as written in the `type` field
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::If(_) => "If",
            NodeKind::Filter(_) => "Filter",
            NodeKind::Switch(_) => "Switch",
            NodeKind::Set(_) => "Set",
            NodeKind::RemoveDuplicates(_) => "RemoveDuplicates",
        }
    }
}

// ============================================================================
// Operand Type Methods
// ============================================================================

use ConditionOperation as Op;

const PRESENCE_OPS: [ConditionOperation; 4] = [Op::Exists, Op::NotExists, Op::Empty, Op::NotEmpty];

impl OperandType {
    /// Operations available for this operand type.
    pub fn operations(&self) -> &'static [ConditionOperation] {
        match self {
            OperandType::String => &[
                Op::Exists,
                Op::NotExists,
                Op::Empty,
                Op::NotEmpty,
                Op::Equals,
                Op::NotEquals,
                Op::Contains,
                Op::NotContains,
                Op::StartsWith,
                Op::NotStartsWith,
                Op::EndsWith,
                Op::NotEndsWith,
                Op::Regex,
                Op::NotRegex,
            ],
            OperandType::Number => &[
                Op::Exists,
                Op::NotExists,
                Op::Empty,
                Op::NotEmpty,
                Op::Equals,
                Op::NotEquals,
                Op::Gt,
                Op::Lt,
                Op::Gte,
                Op::Lte,
            ],
            OperandType::DateTime => &[
                Op::Exists,
                Op::NotExists,
                Op::Empty,
                Op::NotEmpty,
                Op::Equals,
                Op::NotEquals,
                Op::After,
                Op::Before,
                Op::AfterOrEquals,
                Op::BeforeOrEquals,
            ],
            OperandType::Boolean => &[
                Op::Exists,
                Op::NotExists,
                Op::Empty,
                Op::NotEmpty,
                Op::True,
                Op::False,
                Op::Equals,
                Op::NotEquals,
            ],
            OperandType::Array => &[
                Op::Exists,
                Op::NotExists,
                Op::Empty,
                Op::NotEmpty,
                Op::Contains,
                Op::NotContains,
                Op::LengthEquals,
                Op::LengthNotEquals,
                Op::LengthGt,
                Op::LengthLt,
                Op::LengthGte,
                Op::LengthLte,
            ],
            OperandType::Object => &PRESENCE_OPS,
        }
    }

    /// Whether `operation` is defined for this operand type.
    pub fn supports(&self, operation: ConditionOperation) -> bool {
        self.operations().contains(&operation)
    }
}

impl ConditionOperation {
    /// Operations that only look at the left value.
    pub fn is_unary(&self) -> bool {
        PRESENCE_OPS.contains(self) || matches!(self, Op::True | Op::False)
    }
}

impl ConditionOperator {
    /// Check that the operation is defined for the operand type.
    pub fn validate(&self) -> Result<(), String> {
        if self.operand_type.supports(self.operation) {
            return Ok(());
        }
        let allowed: Vec<&str> = self
            .operand_type
            .operations()
            .iter()
            .map(|op| op.as_ref())
            .collect();
        Err(format!(
            "Operation '{}' is not available for type '{}'. Allowed: {}",
            self.operation,
            self.operand_type,
            allowed.join(", ")
        ))
    }
}

// ============================================================================
// Condition Group Methods
// ============================================================================

impl ConditionGroup {
    /// Validate every operator of the group.
    pub fn validate(&self) -> Result<(), String> {
        for (index, condition) in self.conditions.iter().enumerate() {
            let label = || {
                condition
                    .id
                    .clone()
                    .unwrap_or_else(|| format!("#{}", index))
            };
            condition
                .operator
                .validate()
                .map_err(|e| format!("Condition {}: {}", label(), e))?;
            if !condition.operator.operation.is_unary() && condition.right_value.is_none() {
                return Err(format!(
                    "Condition {}: operation '{}' requires a right value",
                    label(),
                    condition.operator.operation
                ));
            }
        }
        Ok(())
    }

    /// Group options with node-level overrides applied.
    ///
    /// Overrides only ever relax the group options: `ignore_case` turns case
    /// sensitivity off and `loose` switches to loose type validation.
    pub fn effective_options(&self, ignore_case: bool, loose: bool) -> ConditionOptions {
        let mut options = self.options;
        if ignore_case {
            options.case_sensitive = false;
        }
        if loose {
            options.type_validation = TypeValidation::Loose;
        }
        options
    }
}

// ============================================================================
// FieldList Methods
// ============================================================================

impl FieldList {
    /// Field names, trimmed, with empty entries removed.
    pub fn fields(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            FieldList::Csv(s) => s.split(',').collect(),
            FieldList::List(list) => list.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect()
    }
}

// ============================================================================
// Switch Methods
// ============================================================================

impl SwitchRulesConfig {
    /// Number of output ports.
    pub fn output_count(&self) -> usize {
        match self.options.fallback_output {
            FallbackOutput::Extra => self.rules.len() + 1,
            _ => self.rules.len(),
        }
    }

    /// Validate rule operators and the fallback target.
    pub fn validate(&self) -> Result<(), String> {
        for (index, rule) in self.rules.iter().enumerate() {
            rule.conditions
                .validate()
                .map_err(|e| format!("Routing rule {}: {}", index, e))?;
        }
        if let FallbackOutput::Output(target) = self.options.fallback_output
            && target >= self.rules.len()
        {
            return Err(format!(
                "Fallback output {} does not exist. There are {} rule outputs",
                target,
                self.rules.len()
            ));
        }
        Ok(())
    }

    /// Labels of the output ports, in order.
    pub fn output_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                rule.output_key
                    .clone()
                    .filter(|k| !k.is_empty())
                    .unwrap_or_else(|| index.to_string())
            })
            .collect();
        if self.options.fallback_output == FallbackOutput::Extra {
            names.push(
                self.options
                    .rename_fallback_output
                    .clone()
                    .filter(|k| !k.is_empty())
                    .unwrap_or_else(|| "Fallback".to_string()),
            );
        }
        names
    }
}

impl SwitchParameters {
    /// Labels of the output ports, in order.
    pub fn output_names(&self) -> Vec<String> {
        match self {
            SwitchParameters::Rules(config) => config.output_names(),
            SwitchParameters::Expression(config) => {
                (0..config.number_outputs).map(|i| i.to_string()).collect()
            }
        }
    }
}

// ============================================================================
// Node Methods
// ============================================================================

impl Node {
    /// Validate parameters that can be checked without input data.
    pub fn validate(&self) -> Result<(), String> {
        match &self.kind {
            NodeKind::If(params) => params.conditions.validate(),
            NodeKind::Filter(params) => params.conditions.validate(),
            NodeKind::Switch(SwitchParameters::Rules(config)) => config.validate(),
            NodeKind::Switch(SwitchParameters::Expression(config)) => {
                if config.number_outputs == 0 {
                    return Err("Switch needs at least one output".to_string());
                }
                Ok(())
            }
            NodeKind::Set(params) => {
                if let SetMode::Manual { assignments } = &params.mode
                    && let Some(index) = assignments.iter().position(|a| a.name.trim().is_empty())
                {
                    return Err(format!("Assignment #{} has an empty field name", index));
                }
                Ok(())
            }
            NodeKind::RemoveDuplicates(params) => match params {
                RemoveDuplicatesParameters::RemoveItemsRepeatedInPreviousExecutions(config)
                    if config.options.history_size == Some(0) =>
                {
                    Err("History size must be at least 1".to_string())
                }
                _ => Ok(()),
            },
        }
    }

    /// Labels of the output ports, in order.
    pub fn output_names(&self) -> Vec<String> {
        match &self.kind {
            NodeKind::If(_) => vec!["true".to_string(), "false".to_string()],
            NodeKind::Filter(params) if params.always_output_discarded => {
                vec!["kept".to_string(), "discarded".to_string()]
            }
            NodeKind::Filter(_) => vec!["kept".to_string()],
            NodeKind::Switch(params) => params.output_names(),
            NodeKind::Set(_) | NodeKind::RemoveDuplicates(_) => vec!["main".to_string()],
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
