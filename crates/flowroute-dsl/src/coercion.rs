// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Type coercion utilities for node parameters.
//!
//! Bridges loosely-typed item data (e.g., APIs returning numbers as strings)
//! and the declared types of condition operands and Set assignments.
//!
//! # Supported Coercions
//!
//! | From | To | Example |
//! |------|-----|---------|
//! | String | number | `"1840"` → `1840` |
//! | Bool | number | `true` → `1` |
//! | String | boolean | `"true"`, `"1"` → `true`; `"false"`, `"0"` → `false` |
//! | Number | boolean | `1` → `true`, `0` → `false` |
//! | Number/Bool | string | `42` → `"42"` |
//! | Array/Object | string | `[1]` → `"[1]"` |
//! | String | array/object | `"[1,2]"` → `[1, 2]` |

use serde_json::{Number, Value};

use crate::FieldType;

/// A value could not be converted to the requested type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionError {
    /// Requested type name
    pub expected: String,
    /// JSON type of the offending value
    pub actual: &'static str,
    /// Short rendering of the offending value
    pub value: String,
}

impl std::fmt::Display for CoercionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Wrong type: '{}' is {} {} but was expecting {} {}",
            self.value,
            article(self.actual),
            self.actual,
            article(&self.expected),
            self.expected
        )
    }
}

impl std::error::Error for CoercionError {}

fn article(word: &str) -> &'static str {
    match word.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

impl CoercionError {
    /// Build an error for `value` not being of type `expected`.
    pub fn new(value: &Value, expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            actual: json_type_name(value),
            value: preview(value),
        }
    }
}

/// JSON type name of a value, as used in error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Render a value for an error message, truncated to 60 characters.
pub fn preview(value: &Value) -> String {
    let rendered = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if rendered.chars().count() > 60 {
        let truncated: String = rendered.chars().take(57).collect();
        format!("{}...", truncated)
    } else {
        rendered
    }
}

/// Whether a value already has the given type, without conversion.
pub fn has_type(value: &Value, field_type: FieldType) -> bool {
    matches!(
        (field_type, value),
        (FieldType::String, Value::String(_))
            | (FieldType::Number, Value::Number(_))
            | (FieldType::Boolean, Value::Bool(_))
            | (FieldType::Array, Value::Array(_))
            | (FieldType::Object, Value::Object(_))
    )
}

/// Convert a value to the given type.
///
/// Null passes through unchanged. Values already of the requested type are
/// returned as-is.
pub fn coerce_to_type(value: &Value, field_type: FieldType) -> Result<Value, CoercionError> {
    if value.is_null() || has_type(value, field_type) {
        return Ok(value.clone());
    }

    let converted = match (field_type, value) {
        // String → number
        (FieldType::Number, Value::String(s)) => parse_number(s.trim()),

        // Bool → number
        (FieldType::Number, Value::Bool(b)) => Some(Value::Number(Number::from(*b as i64))),

        // String → bool
        (FieldType::Boolean, Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" => Some(Value::Bool(true)),
            "false" | "0" => Some(Value::Bool(false)),
            _ => None,
        },

        // Number → bool (only 0 and 1)
        (FieldType::Boolean, Value::Number(n)) => match n.as_f64() {
            Some(f) if f == 1.0 => Some(Value::Bool(true)),
            Some(f) if f == 0.0 => Some(Value::Bool(false)),
            _ => None,
        },

        // Scalars and structures → string
        (FieldType::String, Value::Number(n)) => Some(Value::String(n.to_string())),
        (FieldType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
        (FieldType::String, other @ (Value::Array(_) | Value::Object(_))) => {
            Some(Value::String(other.to_string()))
        }

        // JSON text → array/object
        (FieldType::Array, Value::String(s)) => serde_json::from_str::<Value>(s)
            .ok()
            .filter(Value::is_array),
        (FieldType::Object, Value::String(s)) => serde_json::from_str::<Value>(s)
            .ok()
            .filter(Value::is_object),

        _ => None,
    };

    converted.ok_or_else(|| CoercionError::new(value, field_type.to_string()))
}

/// Parse a number, preferring an integer representation.
fn parse_number(s: &str) -> Option<Value> {
    if s.is_empty() {
        return None;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::Number(Number::from(i)));
    }
    s.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}
