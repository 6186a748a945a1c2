// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Specification Generation Module
//!
//! Generates the JSON Schema of node definitions so editors and clients can
//! validate node JSON before handing it to the executor.

pub mod node_schema;

pub use node_schema::{NODE_SCHEMA_VERSION, generate_node_schema};
