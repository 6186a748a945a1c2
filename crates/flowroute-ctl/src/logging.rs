// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Logging bootstrap for the CLI.

use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

/// Default directives when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "flowroute=info";

/// Loads the `.env` file, then builds the log filter from `RUST_LOG`.
///
/// The file is read before the filter so a `RUST_LOG` set there takes effect.
/// `env_file` defaults to the nearest `.env`. The load result is returned so
/// the caller can report it once a subscriber is installed.
pub fn load_env_filter(env_file: Option<&Path>) -> (EnvFilter, dotenvy::Result<PathBuf>) {
    let loaded = match env_file {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    (filter, loaded)
}
