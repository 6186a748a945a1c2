// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Flowroute Control
//!
//! Runs single nodes against JSON input and inspects deduplication history
//! from the command line. The `flowroute-ctl` binary is a thin argument
//! parser over [`commands`].
//!
//! # Example
//!
//! ```no_run
//! use flowroute_ctl::commands::{RunOptions, load_node, open_history, parse_items, run_node};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = flowroute_core::Config::from_env()?;
//! let node = load_node(std::path::Path::new("dedupe.json"))?;
//! let items = parse_items(r#"[{"id": 1}, {"id": 1}]"#)?;
//! let history = open_history(&config, false).await?;
//!
//! let options = RunOptions {
//!     workflow_id: "orders".to_string(),
//!     ..Default::default()
//! };
//! let result = run_node(&node, items, &options, history, config.history_size).await?;
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! # Ok(())
//! # }
//! ```

pub mod commands;
mod error;
pub mod logging;

pub use error::{CtlError, Result};
