// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Flowroute Core - Deduplication History
//!
//! This crate remembers which values a node (or a whole workflow) has
//! already processed, so that items seen in earlier executions can be
//! dropped. It is used by the `RemoveDuplicates` node in `flowroute-nodes`.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────┐
//! │   RemoveDuplicates node       │
//! │   (flowroute-nodes)           │
//! └───────────────┬───────────────┘
//!                 │ values, scope, mode
//!                 ▼
//! ┌───────────────────────────────┐
//! │   ProcessedDataManager        │
//! │   check / record / clear      │
//! └───────────────┬───────────────┘
//!                 │ whole records
//!                 ▼
//! ┌───────────────────────────────┐
//! │   HistoryStore                │
//! │   SQLite  |  in-memory        │
//! └───────────────────────────────┘
//! ```
//!
//! # Scopes
//!
//! | Context | Key | Shared by |
//! |---------|-----|-----------|
//! | `node` | workflow id + node id | one node |
//! | `workflow` | workflow id | every node of the workflow |
//!
//! # Modes
//!
//! | Mode | Remembers | New when |
//! |------|-----------|----------|
//! | `entries` | SHA-256 digests of values, bounded FIFO | digest not remembered |
//! | `latestIncrementalKey` | highest number | strictly greater |
//! | `latestDate` | latest instant | strictly later |
//!
//! # Configuration
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `DATA_DIR` | No | `.data` | Local state directory |
//! | `FLOWROUTE_DATABASE_URL` | No | `sqlite:<DATA_DIR>/flowroute.db?mode=rwc` | History database |
//! | `FLOWROUTE_HISTORY_SIZE` | No | `10000` | Default bound of entries-mode histories |
//!
//! # Modules
//!
//! - [`config`]: Configuration from environment variables
//! - [`error`]: Error types with stable error codes
//! - [`persistence`]: History stores (SQLite, in-memory)
//! - [`processed_data`]: Check-and-record logic
//! - [`time`]: Date parsing

#![deny(missing_docs)]

/// Configuration loaded from environment variables.
pub mod config;

/// Error types for history operations with stable error codes.
pub mod error;

/// History record stores.
pub mod persistence;

/// Deduplication check-and-record semantics.
pub mod processed_data;

/// Date parsing helpers.
pub mod time;

pub use config::{Config, ConfigError};
pub use error::CoreError;
pub use persistence::{
    HistoryContext, HistoryData, HistoryMode, HistoryRecord, HistoryStore, MemoryHistoryStore,
    ScopeKey, SqliteHistoryStore,
};
pub use processed_data::{ProcessedCheck, ProcessedDataManager};
