// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Log filter bootstrap tests. Kept in their own binary since they touch `RUST_LOG`.

use std::sync::Mutex;

use flowroute_ctl::logging::{DEFAULT_FILTER, load_env_filter};
use tempfile::TempDir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_rust_log() {
    // SAFETY: tests in this binary hold ENV_LOCK while touching the environment
    unsafe { std::env::remove_var("RUST_LOG") };
}

#[test]
fn test_rust_log_from_env_file_is_applied() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_rust_log();

    let dir = TempDir::new().unwrap();
    let env_file = dir.path().join(".env");
    std::fs::write(&env_file, "RUST_LOG=flowroute_ctl=trace\n").unwrap();

    let (filter, loaded) = load_env_filter(Some(&env_file));
    clear_rust_log();

    assert_eq!(loaded.unwrap(), env_file);
    assert!(filter.to_string().contains("flowroute_ctl=trace"));
}

#[test]
fn test_missing_env_file_falls_back_to_default() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_rust_log();

    let dir = TempDir::new().unwrap();
    let (filter, loaded) = load_env_filter(Some(&dir.path().join(".env")));

    assert!(loaded.is_err());
    assert!(filter.to_string().contains(DEFAULT_FILTER));
}
