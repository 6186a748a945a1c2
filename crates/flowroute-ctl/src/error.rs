// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for flowroute-ctl.

use flowroute_core::{ConfigError, CoreError};
use flowroute_nodes::NodeError;
use thiserror::Error;

/// Result type using CtlError.
pub type Result<T> = std::result::Result<T, CtlError>;

/// Errors raised by the control commands.
#[derive(Debug, Error)]
pub enum CtlError {
    /// Configuration error (invalid environment values).
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A file could not be read.
    #[error("cannot read {path}: {details}")]
    Io { path: String, details: String },

    /// Node definition or input items are not valid JSON of the right shape.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The node failed.
    #[error("node error {0}")]
    Node(#[from] NodeError),

    /// The deduplication history failed.
    #[error("history error [{}]: {}", .0.error_code(), .0)]
    History(#[from] CoreError),
}

impl From<serde_json::Error> for CtlError {
    fn from(err: serde_json::Error) -> Self {
        CtlError::InvalidInput(err.to_string())
    }
}
