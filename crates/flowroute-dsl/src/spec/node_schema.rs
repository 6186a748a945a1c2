// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Node Schema Generation
//!
//! Generates JSON Schema for node definitions from the Rust types in
//! schema_types.rs using schemars.

use schemars::schema_for;
use serde_json::{Value, json};
use strum::VariantNames;

use crate::{ConditionOperation, Node, OperandType};

/// Version of the node definition format
pub const NODE_SCHEMA_VERSION: &str = "1.0.0";

/// Generate the node definition schema with operator metadata
pub fn generate_node_schema() -> Value {
    let schema = schema_for!(Node);
    let mut schema_json = serde_json::to_value(&schema).unwrap_or(Value::Null);

    // Operations per operand type, for editors building condition pickers
    let operators: serde_json::Map<String, Value> = OperandType::VARIANTS
        .iter()
        .filter_map(|name| {
            let operand_type: OperandType = serde_json::from_value(json!(name)).ok()?;
            let operations: Vec<&str> = operand_type
                .operations()
                .iter()
                .map(|op| op.as_ref())
                .collect();
            Some((name.to_string(), json!(operations)))
        })
        .collect();

    if let Value::Object(ref mut map) = schema_json {
        map.insert("x-operators".to_string(), Value::Object(operators));
        map.insert(
            "x-operations".to_string(),
            json!(ConditionOperation::VARIANTS),
        );
        map.insert(
            "x-node-schema-version".to_string(),
            Value::String(NODE_SCHEMA_VERSION.to_string()),
        );
    }

    schema_json
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_node_schema() {
        let schema = generate_node_schema();

        assert_eq!(
            schema.get("x-node-schema-version").and_then(|v| v.as_str()),
            Some(NODE_SCHEMA_VERSION)
        );
        assert_eq!(schema["title"], "Node");
    }

    #[test]
    fn test_operator_metadata() {
        let schema = generate_node_schema();
        let operators = &schema["x-operators"];

        assert_eq!(operators.as_object().map(|m| m.len()), Some(6));
        let date_ops = operators["dateTime"].as_array().unwrap();
        assert!(date_ops.contains(&json!("afterOrEquals")));
        let object_ops = operators["object"].as_array().unwrap();
        assert_eq!(object_ops.len(), 4);
    }
}
