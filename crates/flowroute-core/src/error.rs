// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for flowroute-core.
//!
//! Provides a unified error type with stable machine-readable codes.

use std::fmt;

/// Result type using CoreError
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the deduplication history layer.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum CoreError {
    /// Stored history was written with a different mode than the one requested.
    IncompatibleMode {
        /// Scope the history belongs to.
        scope: String,
        /// Mode of the stored history.
        stored: String,
        /// Mode of the current request.
        requested: String,
    },

    /// A value cannot be used with the requested mode.
    InvalidValue {
        /// Mode the value was checked for.
        mode: String,
        /// Position of the value in the batch.
        index: usize,
        /// The offending value.
        value: String,
    },

    /// The operation is not defined for the mode.
    UnsupportedOperation {
        /// Operation name.
        operation: String,
        /// Mode name.
        mode: String,
    },

    /// Input validation failed.
    ValidationError {
        /// The field that failed validation.
        field: String,
        /// The validation error message.
        message: String,
    },

    /// Database operation failed.
    DatabaseError {
        /// The operation that failed.
        operation: String,
        /// Error details.
        details: String,
    },
}

impl CoreError {
    /// Get the error code string for this error type.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::IncompatibleMode { .. } => "INCOMPATIBLE_HISTORY_MODE",
            Self::InvalidValue { .. } => "INVALID_HISTORY_VALUE",
            Self::UnsupportedOperation { .. } => "UNSUPPORTED_HISTORY_OPERATION",
            Self::ValidationError { .. } => "VALIDATION_ERROR",
            Self::DatabaseError { .. } => "DATABASE_ERROR",
        }
    }

    /// Position of the offending value, when the error concerns a single value.
    pub fn value_index(&self) -> Option<usize> {
        match self {
            Self::InvalidValue { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompatibleMode {
                scope,
                stored,
                requested,
            } => {
                write!(
                    f,
                    "Deduplication data was originally saved with an incompatible setting \
                     ('{}', now '{}') for {}. Clear the deduplication history to reset it",
                    stored, requested, scope
                )
            }
            Self::InvalidValue { mode, index, value } => match mode.as_str() {
                "latestIncrementalKey" => write!(
                    f,
                    "Value '{}' of item {} is not a number",
                    value, index
                ),
                "latestDate" => write!(
                    f,
                    "Value '{}' of item {} is not a valid date",
                    value, index
                ),
                _ => write!(
                    f,
                    "Value '{}' of item {} cannot be used in mode '{}'",
                    value, index, mode
                ),
            },
            Self::UnsupportedOperation { operation, mode } => {
                write!(
                    f,
                    "Operation '{}' is not supported in mode '{}'",
                    operation, mode
                )
            }
            Self::ValidationError { field, message } => {
                write!(f, "Validation error for '{}': {}", field, message)
            }
            Self::DatabaseError { operation, details } => {
                write!(f, "Database error during '{}': {}", operation, details)
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        CoreError::DatabaseError {
            operation: "query".to_string(),
            details: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::DatabaseError {
            operation: "json".to_string(),
            details: err.to_string(),
        }
    }
}
