// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! In-memory persistence for tests and one-off runs.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::CoreError;

use super::{HistoryData, HistoryRecord, HistoryStore, ScopeKey};

/// History store kept in process memory. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    records: RwLock<HashMap<ScopeKey, HistoryRecord>>,
}

impl MemoryHistoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn load(&self, scope: &ScopeKey) -> Result<Option<HistoryRecord>, CoreError> {
        Ok(self.records.read().await.get(scope).cloned())
    }

    async fn save(&self, scope: &ScopeKey, data: &HistoryData) -> Result<(), CoreError> {
        let now = Utc::now();
        let mut records = self.records.write().await;
        records
            .entry(scope.clone())
            .and_modify(|record| {
                record.data = data.clone();
                record.updated_at = now;
            })
            .or_insert_with(|| HistoryRecord {
                data: data.clone(),
                created_at: now,
                updated_at: now,
            });
        Ok(())
    }

    async fn delete(&self, scope: &ScopeKey) -> Result<bool, CoreError> {
        Ok(self.records.write().await.remove(scope).is_some())
    }
}
