// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
use std::path::{Path, PathBuf};

/// Get the base data directory path from environment variable or default
///
/// The data directory can be configured via the `DATA_DIR` environment variable.
/// If not set, defaults to `./.data` for local development.
pub fn get_data_dir() -> PathBuf {
    std::env::var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".data"))
}

/// Path of the deduplication history database inside a data directory
///
/// Returns `{data_dir}/flowroute.db`
pub fn history_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("flowroute.db")
}

/// SQLite connection URL for the history database, creating the file on first use
///
/// Returns `sqlite:{data_dir}/flowroute.db?mode=rwc`
pub fn history_database_url(data_dir: &Path) -> String {
    format!(
        "sqlite:{}?mode=rwc",
        history_db_path(data_dir).to_string_lossy()
    )
}
