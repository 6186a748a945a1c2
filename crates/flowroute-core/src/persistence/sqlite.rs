// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! SQLite-backed persistence implementation.

use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::debug;

use crate::error::CoreError;

use super::{HistoryData, HistoryRecord, HistoryStore, ScopeKey};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations/sqlite");

/// Raw row of the `processed_data` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ProcessedDataRow {
    mode: String,
    value: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProcessedDataRow {
    fn into_record(self) -> Result<HistoryRecord, CoreError> {
        let data: HistoryData = serde_json::from_str(&self.value)?;
        if data.mode().as_str() != self.mode {
            return Err(CoreError::DatabaseError {
                operation: "decode".to_string(),
                details: format!(
                    "stored mode '{}' does not match value of mode '{}'",
                    self.mode,
                    data.mode()
                ),
            });
        }
        Ok(HistoryRecord {
            data,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SQLite-backed history store.
#[derive(Clone)]
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

impl SqliteHistoryStore {
    /// Create a new SQLite store from an existing, migrated pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite URL and run migrations.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = SqliteHistoryStore::connect("sqlite::memory:").await?;
    /// ```
    pub async fn connect(url: &str) -> Result<Self, CoreError> {
        // In-memory databases are per-connection; keep a single one
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| CoreError::DatabaseError {
                operation: "connect".to_string(),
                details: format!("Failed to connect to SQLite at {}: {}", url, e),
            })?;

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Create and initialize a store from a file path.
    ///
    /// Creates parent directories and the database file when missing, then
    /// runs all migrations.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::DatabaseError {
                operation: "create_dir".to_string(),
                details: format!("Failed to create directory {:?}: {}", parent, e),
            })?;
        }

        let url = format!("sqlite:{}?mode=rwc", path.to_string_lossy());
        Self::connect(&url).await
    }

    /// Run the embedded migrations against a pool.
    pub async fn migrate(pool: &SqlitePool) -> Result<(), CoreError> {
        MIGRATOR
            .run(pool)
            .await
            .map_err(|e| CoreError::DatabaseError {
                operation: "migrate".to_string(),
                details: format!("Failed to run migrations: {}", e),
            })
    }

    /// Close the underlying pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait::async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn load(&self, scope: &ScopeKey) -> Result<Option<HistoryRecord>, CoreError> {
        let row = sqlx::query_as::<_, ProcessedDataRow>(
            r#"
            SELECT mode, value, created_at, updated_at
            FROM processed_data
            WHERE context = ? AND workflow_id = ? AND node_id = ?
            "#,
        )
        .bind(scope.context.as_str())
        .bind(&scope.workflow_id)
        .bind(&scope.node_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProcessedDataRow::into_record).transpose()
    }

    async fn save(&self, scope: &ScopeKey, data: &HistoryData) -> Result<(), CoreError> {
        let value = serde_json::to_string(data)?;
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO processed_data (context, workflow_id, node_id, mode, value, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            ON CONFLICT (context, workflow_id, node_id) DO UPDATE
            SET mode = excluded.mode,
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(scope.context.as_str())
        .bind(&scope.workflow_id)
        .bind(&scope.node_id)
        .bind(data.mode().as_str())
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(scope = %scope, mode = %data.mode(), size = data.len(), "Saved deduplication history");
        Ok(())
    }

    async fn delete(&self, scope: &ScopeKey) -> Result<bool, CoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM processed_data
            WHERE context = ? AND workflow_id = ? AND node_id = ?
            "#,
        )
        .bind(scope.context.as_str())
        .bind(&scope.workflow_id)
        .bind(&scope.node_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create an in-memory SQLite store for testing.
    async fn test_store() -> SqliteHistoryStore {
        SqliteHistoryStore::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory SQLite store")
    }

    #[tokio::test]
    async fn test_save_and_load_entries() {
        let store = test_store().await;
        let scope = ScopeKey::node("wf-1", "dedupe");

        let data = HistoryData::Entries(vec!["d1".to_string(), "d2".to_string()]);
        store.save(&scope, &data).await.expect("save");

        let record = store
            .load(&scope)
            .await
            .expect("load")
            .expect("record should exist");
        assert_eq!(record.data, data);
        assert!(record.updated_at >= record.created_at);
    }

    #[tokio::test]
    async fn test_load_missing_scope() {
        let store = test_store().await;
        let record = store
            .load(&ScopeKey::workflow("unknown"))
            .await
            .expect("load");
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_existing_record() {
        let store = test_store().await;
        let scope = ScopeKey::workflow("wf-2");

        store
            .save(&scope, &HistoryData::LatestIncrementalKey(10.0))
            .await
            .unwrap();
        store
            .save(&scope, &HistoryData::LatestIncrementalKey(25.0))
            .await
            .unwrap();

        let record = store.load(&scope).await.unwrap().unwrap();
        assert_eq!(record.data, HistoryData::LatestIncrementalKey(25.0));

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM processed_data")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_node_and_workflow_scopes_do_not_collide() {
        let store = test_store().await;
        let node = ScopeKey::node("wf-3", "n1");
        let shared = ScopeKey::workflow("wf-3");

        store
            .save(&node, &HistoryData::Entries(vec!["x".to_string()]))
            .await
            .unwrap();
        store
            .save(&shared, &HistoryData::Entries(vec!["y".to_string()]))
            .await
            .unwrap();

        let node_record = store.load(&node).await.unwrap().unwrap();
        let shared_record = store.load(&shared).await.unwrap().unwrap();
        assert_eq!(node_record.data, HistoryData::Entries(vec!["x".to_string()]));
        assert_eq!(
            shared_record.data,
            HistoryData::Entries(vec!["y".to_string()])
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let store = test_store().await;
        let scope = ScopeKey::node("wf-4", "n1");

        assert!(!store.delete(&scope).await.unwrap());
        store
            .save(&scope, &HistoryData::LatestDate(Utc::now()))
            .await
            .unwrap();
        assert!(store.delete(&scope).await.unwrap());
        assert!(store.load(&scope).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_row_is_reported() {
        let store = test_store().await;
        sqlx::query(
            "INSERT INTO processed_data (context, workflow_id, node_id, mode, value) VALUES ('node', 'wf', 'n', 'entries', 'not json')",
        )
        .execute(&store.pool)
        .await
        .unwrap();

        let err = store.load(&ScopeKey::node("wf", "n")).await.unwrap_err();
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }
}
