// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Items flowing between nodes

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Back-reference from an output item to the input item it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedItem {
    /// Index of the input item
    pub item: usize,
}

/// One JSON object flowing between nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Item data
    pub json: Map<String, Value>,
    /// Input item this item was derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paired_item: Option<PairedItem>,
}

/// One item list per output port, in port order.
pub type NodeOutput = Vec<Vec<Item>>;

impl Item {
    /// Item with no pairing information.
    pub fn new(json: Map<String, Value>) -> Self {
        Self {
            json,
            paired_item: None,
        }
    }

    /// Item derived from the input item at `index`.
    pub fn paired(json: Map<String, Value>, index: usize) -> Self {
        Self {
            json,
            paired_item: Some(PairedItem { item: index }),
        }
    }

    /// Item carrying only an error message, derived from input `index`.
    pub fn error(message: impl Into<String>, index: usize) -> Self {
        let mut json = Map::new();
        json.insert("error".to_string(), Value::String(message.into()));
        Self::paired(json, index)
    }

    /// Build an item from arbitrary JSON. Non-objects are wrapped as `{"value": ..}`.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(json) => Self::new(json),
            other => {
                let mut json = Map::new();
                json.insert("value".to_string(), other);
                Self::new(json)
            }
        }
    }

    /// Item data as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.json.clone())
    }

    /// Item as a `{"json": {...}, "pairedItem": {...}}` envelope.
    pub fn to_envelope(&self) -> Value {
        let mut envelope = Map::new();
        envelope.insert("json".to_string(), self.to_value());
        if let Some(paired) = self.paired_item {
            let mut pairing = Map::new();
            pairing.insert("item".to_string(), Value::from(paired.item));
            envelope.insert("pairedItem".to_string(), Value::Object(pairing));
        }
        Value::Object(envelope)
    }
}

/// Load an input item list.
///
/// Accepts an array (or a single value) of plain JSON objects, or of
/// `{"json": {...}, "pairedItem": {...}}` envelopes.
pub fn items_from_value(value: Value) -> Vec<Item> {
    let values = match value {
        Value::Array(values) => values,
        other => vec![other],
    };

    values
        .into_iter()
        .map(|value| match value {
            Value::Object(map) if is_envelope(&map) => {
                serde_json::from_value(Value::Object(map.clone()))
                    .unwrap_or_else(|_| Item::new(map))
            }
            other => Item::from_value(other),
        })
        .collect()
}

fn is_envelope(map: &Map<String, Value>) -> bool {
    matches!(map.get("json"), Some(Value::Object(_)))
        && map.keys().all(|k| k == "json" || k == "pairedItem")
}
