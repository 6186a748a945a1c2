// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Dot-path access into item data
//!
//! Paths look like `customer.address.city` or `lines.0.sku`. A leading
//! `$json.` or `$.` is ignored. Numeric segments index arrays. With dot
//! notation disabled a path is a single literal key.

use serde_json::{Map, Value};

use crate::types::NodeError;

/// Split a path into segments.
pub fn split_path(path: &str) -> Vec<&str> {
    let path = path
        .strip_prefix("$json.")
        .or_else(|| path.strip_prefix("$."))
        .unwrap_or(path);
    if path.is_empty() {
        return Vec::new();
    }
    path.split('.').collect()
}

fn segments(path: &str, dot_notation: bool) -> Vec<&str> {
    if dot_notation {
        split_path(path)
    } else {
        vec![path]
    }
}

/// Look up a path in a JSON value. `None` when any segment is missing.
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    lookup(value, &split_path(path))
}

fn lookup<'a>(value: &'a Value, parts: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for part in parts {
        current = match current {
            Value::Object(map) => map.get(*part)?,
            Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Look up a field of an item.
pub fn get_field<'a>(
    json: &'a Map<String, Value>,
    path: &str,
    dot_notation: bool,
) -> Option<&'a Value> {
    let parts = segments(path, dot_notation);
    let (first, rest) = parts.split_first()?;
    lookup(json.get(*first)?, rest)
}

/// Write a field of an item, creating intermediate objects as needed.
///
/// Intermediate values that are neither objects nor indexable arrays are
/// replaced by objects. A numeric segment may overwrite an array element or
/// append one; an index past the end of the array is an item error.
pub fn set_field(
    json: &mut Map<String, Value>,
    path: &str,
    value: Value,
    dot_notation: bool,
) -> Result<(), NodeError> {
    let parts = segments(path, dot_notation);
    set_nested_value(json, &parts, value).map_err(|(index, len)| {
        NodeError::item(
            "INVALID_FIELD_PATH",
            format!(
                "Cannot write '{}': index {} is past the end of an array of length {}",
                path, index, len
            ),
        )
        .with_attr("field", path)
    })
}

/// Out-of-range array write, as `(index, array length)`.
type OutOfRange = (usize, usize);

fn set_nested_value(
    map: &mut Map<String, Value>,
    parts: &[&str],
    value: Value,
) -> Result<(), OutOfRange> {
    let Some((key, rest)) = parts.split_first() else {
        return Ok(());
    };

    if rest.is_empty() {
        map.insert(key.to_string(), value);
        return Ok(());
    }

    let next = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    set_in_value(next, rest, value)
}

fn set_in_value(target: &mut Value, parts: &[&str], value: Value) -> Result<(), OutOfRange> {
    let Some((key, rest)) = parts.split_first() else {
        *target = value;
        return Ok(());
    };

    if let Value::Array(arr) = target
        && let Ok(index) = key.parse::<usize>()
    {
        if index > arr.len() {
            return Err((index, arr.len()));
        }
        if index == arr.len() {
            arr.push(Value::Null);
        }
        if rest.is_empty() {
            arr[index] = value;
            return Ok(());
        }
        if !arr[index].is_object() && !arr[index].is_array() {
            arr[index] = Value::Object(Map::new());
        }
        return set_in_value(&mut arr[index], rest, value);
    }

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    match target {
        Value::Object(map) => set_nested_value(map, parts, value),
        _ => Ok(()),
    }
}

/// Remove a field of an item, returning the removed value.
pub fn remove_field(
    json: &mut Map<String, Value>,
    path: &str,
    dot_notation: bool,
) -> Option<Value> {
    let parts = segments(path, dot_notation);
    let (last, parents) = parts.split_last()?;
    let Some((first, middle)) = parents.split_first() else {
        return json.remove(*last);
    };

    let mut current = json.get_mut(*first)?;
    for part in middle {
        current = match current {
            Value::Object(map) => map.get_mut(*part)?,
            Value::Array(arr) => arr.get_mut(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    match current {
        Value::Object(map) => map.remove(*last),
        _ => None,
    }
}
