// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Resolution of parameter values against the current item
//!
//! | Kind | Result |
//! |------|--------|
//! | `reference` | value at a dot path of the item, or the default, or null |
//! | `immediate` | the literal value |
//! | `template` | rendered text; the item is bound as `json`, its position as `index` |
//! | `composite` | object or array of resolved values |

use flowroute_dsl::{CompositeInner, MappingValue};
use minijinja::{Environment, context};
use serde_json::{Map, Value};

use crate::item::Item;
use crate::paths::get_path;
use crate::types::NodeError;

/// Template failures.
#[derive(Debug, thiserror::Error)]
pub enum ExpressionError {
    /// The template text is not valid.
    #[error("Template parse error: {0}")]
    Parse(String),

    /// The template failed while rendering.
    #[error("Template render error: {0}")]
    Render(String),
}

impl From<ExpressionError> for NodeError {
    fn from(err: ExpressionError) -> Self {
        let code = match err {
            ExpressionError::Parse(_) => "TEMPLATE_PARSE_ERROR",
            ExpressionError::Render(_) => "TEMPLATE_RENDER_ERROR",
        };
        NodeError::item(code, err.to_string())
    }
}

/// Resolve a parameter value for the item at `index`.
pub fn resolve(value: &MappingValue, item: &Item, index: usize) -> Result<Value, ExpressionError> {
    let data = item.to_value();
    resolve_in(value, &data, index)
}

fn resolve_in(value: &MappingValue, data: &Value, index: usize) -> Result<Value, ExpressionError> {
    match value {
        MappingValue::Reference(reference) => Ok(get_path(data, &reference.value)
            .cloned()
            .or_else(|| reference.default.clone())
            .unwrap_or(Value::Null)),
        MappingValue::Immediate(immediate) => Ok(immediate.value.clone()),
        MappingValue::Template(template) => {
            render_template(&template.value, data, index).map(Value::String)
        }
        MappingValue::Composite(composite) => match &composite.value {
            CompositeInner::Object(fields) => {
                let mut resolved = Map::new();
                for (key, field) in fields {
                    resolved.insert(key.clone(), resolve_in(field, data, index)?);
                }
                Ok(Value::Object(resolved))
            }
            CompositeInner::Array(elements) => elements
                .iter()
                .map(|element| resolve_in(element, data, index))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
        },
    }
}

/// Render a text template with the item bound as `json`.
pub fn render_template(template: &str, data: &Value, index: usize) -> Result<String, ExpressionError> {
    if template.is_empty() {
        return Ok(String::new());
    }

    let mut env = Environment::new();
    env.add_template("tmpl", template)
        .map_err(|e| ExpressionError::Parse(e.to_string()))?;
    let tmpl = env
        .get_template("tmpl")
        .map_err(|e| ExpressionError::Parse(e.to_string()))?;

    tmpl.render(context! { json => data, index => index })
        .map_err(|e| ExpressionError::Render(e.to_string()))
}
