// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration loading from environment variables.

use std::path::PathBuf;

use flowroute_dsl::DEFAULT_HISTORY_SIZE;
use flowroute_dsl::paths::{get_data_dir, history_database_url};

/// Deduplication history configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL of the history database
    pub database_url: String,
    /// Default number of entries kept per history
    pub history_size: usize,
    /// Directory holding local state
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional (with defaults):
    /// - `DATA_DIR`: local state directory (default: `.data`)
    /// - `FLOWROUTE_DATABASE_URL`: SQLite connection string
    ///   (default: `sqlite:<DATA_DIR>/flowroute.db?mode=rwc`)
    /// - `FLOWROUTE_HISTORY_SIZE`: default history size (default: 10000)
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = get_data_dir();

        let database_url = match std::env::var("FLOWROUTE_DATABASE_URL") {
            Ok(url) if url.trim().is_empty() => {
                return Err(ConfigError::Invalid(
                    "FLOWROUTE_DATABASE_URL",
                    "must not be empty",
                ));
            }
            Ok(url) => url,
            Err(_) => history_database_url(&data_dir),
        };

        if !database_url.starts_with("sqlite:") {
            return Err(ConfigError::Invalid(
                "FLOWROUTE_DATABASE_URL",
                "must be a sqlite: URL",
            ));
        }

        let history_size: usize = std::env::var("FLOWROUTE_HISTORY_SIZE")
            .unwrap_or_else(|_| DEFAULT_HISTORY_SIZE.to_string())
            .parse()
            .ok()
            .filter(|size| *size > 0)
            .ok_or(ConfigError::Invalid(
                "FLOWROUTE_HISTORY_SIZE",
                "must be a positive integer",
            ))?;

        Ok(Self {
            database_url,
            history_size,
            data_dir,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that modify environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to set env vars for a test and restore them after
    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self { vars: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            let old = env::var(key).ok();
            self.vars.push((key.to_string(), old));
            // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
            unsafe { env::set_var(key, value) };
        }

        fn remove(&mut self, key: &str) {
            let old = env::var(key).ok();
            self.vars.push((key.to_string(), old));
            // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
            unsafe { env::remove_var(key) };
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.vars.drain(..).rev() {
                // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
                unsafe {
                    match value {
                        Some(v) => env::set_var(&key, v),
                        None => env::remove_var(&key),
                    }
                }
            }
        }
    }

    #[test]
    fn test_config_from_env_with_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        guard.set("DATA_DIR", "/var/lib/flowroute");
        guard.remove("FLOWROUTE_DATABASE_URL");
        guard.remove("FLOWROUTE_HISTORY_SIZE");

        let config = Config::from_env().unwrap();

        assert_eq!(
            config.database_url,
            "sqlite:/var/lib/flowroute/flowroute.db?mode=rwc"
        );
        assert_eq!(config.history_size, 10_000);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/flowroute"));
    }

    #[test]
    fn test_config_from_env_all_custom() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        guard.set("FLOWROUTE_DATABASE_URL", "sqlite::memory:");
        guard.set("FLOWROUTE_HISTORY_SIZE", "250");

        let config = Config::from_env().unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.history_size, 250);
    }

    #[test]
    fn test_config_rejects_non_sqlite_url() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        guard.set("FLOWROUTE_DATABASE_URL", "postgres://localhost/test");
        guard.remove("FLOWROUTE_HISTORY_SIZE");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("FLOWROUTE_DATABASE_URL", _)));
    }

    #[test]
    fn test_config_rejects_empty_url() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        guard.set("FLOWROUTE_DATABASE_URL", "  ");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("FLOWROUTE_DATABASE_URL"));
    }

    #[test]
    fn test_config_invalid_history_size() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        guard.remove("FLOWROUTE_DATABASE_URL");

        for bad in ["abc", "0", "-5"] {
            guard.set("FLOWROUTE_HISTORY_SIZE", bad);
            let err = Config::from_env().unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid("FLOWROUTE_HISTORY_SIZE", _)),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_config_error_display() {
        let invalid = ConfigError::Invalid("MY_VAR", "must be a number");
        assert_eq!(
            invalid.to_string(),
            "invalid value for MY_VAR: must be a number"
        );
    }
}
