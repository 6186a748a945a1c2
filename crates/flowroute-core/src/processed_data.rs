// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Check-and-record semantics for deduplication history.
//!
//! [`ProcessedDataManager`] sits on top of a [`HistoryStore`] and decides,
//! for a batch of values, which ones are new and which were processed
//! before. Three modes are supported:
//!
//! | Mode | Stored | A value is new when |
//! |------|--------|---------------------|
//! | `entries` | digests of seen values (bounded, oldest dropped first) | its digest is not stored and not repeated earlier in the batch |
//! | `latestIncrementalKey` | highest number seen | it is strictly greater than the stored number |
//! | `latestDate` | latest date seen | it is strictly later than the stored date |
//!
//! A scope's record is tied to the mode that created it; using another mode
//! on the same scope fails until the history is cleared.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::persistence::{HistoryData, HistoryMode, HistoryStore, ScopeKey};
use crate::time::parse_datetime;

/// Outcome of checking a batch of values, as positions in the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedCheck {
    /// Positions of values not processed before.
    pub new: Vec<usize>,
    /// Positions of values already processed.
    pub processed: Vec<usize>,
}

impl ProcessedCheck {
    /// Whether the value at `index` is new.
    pub fn is_new(&self, index: usize) -> bool {
        self.new.binary_search(&index).is_ok()
    }
}

/// Digest stored for an entries-mode value.
pub fn value_digest(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn parse_number(mode: HistoryMode, index: usize, value: &str) -> Result<f64, CoreError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| CoreError::InvalidValue {
            mode: mode.as_str().to_string(),
            index,
            value: value.to_string(),
        })
}

fn parse_date(mode: HistoryMode, index: usize, value: &str) -> Result<DateTime<Utc>, CoreError> {
    parse_datetime(value).ok_or_else(|| CoreError::InvalidValue {
        mode: mode.as_str().to_string(),
        index,
        value: value.to_string(),
    })
}

fn ensure_mode(
    scope: &ScopeKey,
    stored: Option<&HistoryData>,
    requested: HistoryMode,
) -> Result<(), CoreError> {
    match stored {
        Some(data) if data.mode() != requested => Err(CoreError::IncompatibleMode {
            scope: scope.to_string(),
            stored: data.mode().to_string(),
            requested: requested.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Classify `values` against `stored` and compute the history to persist.
///
/// Pure function: all validation happens before anything is returned, so a
/// batch with one invalid value leaves the history untouched.
pub fn evaluate_batch(
    scope: &ScopeKey,
    stored: Option<&HistoryData>,
    mode: HistoryMode,
    values: &[String],
    max_entries: usize,
) -> Result<(ProcessedCheck, HistoryData), CoreError> {
    ensure_mode(scope, stored, mode)?;
    let mut check = ProcessedCheck::default();

    let updated = match mode {
        HistoryMode::Entries => {
            let mut entries = match stored {
                Some(HistoryData::Entries(entries)) => entries.clone(),
                _ => Vec::new(),
            };
            let mut seen: HashSet<String> = entries.iter().cloned().collect();

            for (index, value) in values.iter().enumerate() {
                let digest = value_digest(value);
                if seen.contains(&digest) {
                    check.processed.push(index);
                } else {
                    seen.insert(digest.clone());
                    entries.push(digest);
                    check.new.push(index);
                }
            }

            if entries.len() > max_entries {
                let overflow = entries.len() - max_entries;
                entries.drain(..overflow);
            }
            HistoryData::Entries(entries)
        }
        HistoryMode::LatestIncrementalKey => {
            let numbers = values
                .iter()
                .enumerate()
                .map(|(index, value)| parse_number(mode, index, value))
                .collect::<Result<Vec<f64>, CoreError>>()?;
            let previous = match stored {
                Some(HistoryData::LatestIncrementalKey(n)) => Some(*n),
                _ => None,
            };

            let mut latest = previous;
            for (index, number) in numbers.into_iter().enumerate() {
                if previous.is_none_or(|p| number > p) {
                    check.new.push(index);
                } else {
                    check.processed.push(index);
                }
                latest = Some(latest.map_or(number, |l| l.max(number)));
            }
            match latest {
                Some(n) => HistoryData::LatestIncrementalKey(n),
                None => return Ok((check, HistoryData::Entries(Vec::new()))),
            }
        }
        HistoryMode::LatestDate => {
            let dates = values
                .iter()
                .enumerate()
                .map(|(index, value)| parse_date(mode, index, value))
                .collect::<Result<Vec<DateTime<Utc>>, CoreError>>()?;
            let previous = match stored {
                Some(HistoryData::LatestDate(d)) => Some(*d),
                _ => None,
            };

            let mut latest = previous;
            for (index, date) in dates.into_iter().enumerate() {
                if previous.is_none_or(|p| date > p) {
                    check.new.push(index);
                } else {
                    check.processed.push(index);
                }
                latest = Some(latest.map_or(date, |l| l.max(date)));
            }
            match latest {
                Some(d) => HistoryData::LatestDate(d),
                None => return Ok((check, HistoryData::Entries(Vec::new()))),
            }
        }
    };

    Ok((check, updated))
}

/// Deduplication history manager.
///
/// Check-and-record calls through one manager are serialized, so two
/// concurrent batches never both see the same value as new.
pub struct ProcessedDataManager {
    store: Arc<dyn HistoryStore>,
    lock: Mutex<()>,
}

impl ProcessedDataManager {
    /// Create a manager over a store.
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Classify values without recording them.
    pub async fn check_processed(
        &self,
        scope: &ScopeKey,
        mode: HistoryMode,
        values: &[String],
    ) -> Result<ProcessedCheck, CoreError> {
        scope.validate()?;
        let record = self.store.load(scope).await?;
        let (check, _) = evaluate_batch(
            scope,
            record.as_ref().map(|r| &r.data),
            mode,
            values,
            usize::MAX,
        )?;
        Ok(check)
    }

    /// Classify values and record the new ones.
    ///
    /// In entries mode the history keeps at most `max_entries` digests.
    pub async fn check_processed_and_record(
        &self,
        scope: &ScopeKey,
        mode: HistoryMode,
        values: &[String],
        max_entries: usize,
    ) -> Result<ProcessedCheck, CoreError> {
        scope.validate()?;
        if values.is_empty() {
            return Ok(ProcessedCheck::default());
        }

        let _guard = self.lock.lock().await;
        let record = self.store.load(scope).await?;
        let (check, updated) = evaluate_batch(
            scope,
            record.as_ref().map(|r| &r.data),
            mode,
            values,
            max_entries,
        )?;
        self.store.save(scope, &updated).await?;

        debug!(
            scope = %scope,
            mode = %mode,
            new = check.new.len(),
            processed = check.processed.len(),
            history_size = updated.len(),
            "Checked values against deduplication history"
        );
        Ok(check)
    }

    /// Record values as processed without classifying them.
    pub async fn record(
        &self,
        scope: &ScopeKey,
        mode: HistoryMode,
        values: &[String],
        max_entries: usize,
    ) -> Result<(), CoreError> {
        self.check_processed_and_record(scope, mode, values, max_entries)
            .await
            .map(|_| ())
    }

    /// Forget specific values. Only defined for entries mode.
    pub async fn remove_processed(
        &self,
        scope: &ScopeKey,
        mode: HistoryMode,
        values: &[String],
    ) -> Result<(), CoreError> {
        scope.validate()?;
        if mode != HistoryMode::Entries {
            return Err(CoreError::UnsupportedOperation {
                operation: "removeProcessed".to_string(),
                mode: mode.to_string(),
            });
        }

        let _guard = self.lock.lock().await;
        let Some(record) = self.store.load(scope).await? else {
            return Ok(());
        };
        ensure_mode(scope, Some(&record.data), mode)?;

        if let HistoryData::Entries(entries) = record.data {
            let remove: HashSet<String> = values.iter().map(|v| value_digest(v)).collect();
            let remaining: Vec<String> = entries
                .into_iter()
                .filter(|digest| !remove.contains(digest))
                .collect();
            self.store
                .save(scope, &HistoryData::Entries(remaining))
                .await?;
        }
        Ok(())
    }

    /// Delete the whole history of a scope.
    pub async fn clear_all_processed_items(&self, scope: &ScopeKey) -> Result<(), CoreError> {
        scope.validate()?;
        let _guard = self.lock.lock().await;
        let existed = self.store.delete(scope).await?;
        info!(scope = %scope, existed, "Cleared deduplication history");
        Ok(())
    }

    /// Number of remembered values of a scope.
    pub async fn processed_count(&self, scope: &ScopeKey) -> Result<usize, CoreError> {
        scope.validate()?;
        Ok(self
            .store
            .load(scope)
            .await?
            .map(|record| record.data.len())
            .unwrap_or(0))
    }
}
