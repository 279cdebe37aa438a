//! In-memory record store.
//!
//! Used by tests and throwaway runs. Holds the same uniqueness contract as
//! the SQLite backend, but nothing survives the process.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::models::SeenRecord;
use crate::storage::{RecordStore, StoreResult};

/// Mutex-guarded map of seen records.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<String, SeenRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, SeenRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn exists(&self, identifier: &str) -> StoreResult<bool> {
        Ok(self.records().contains_key(identifier))
    }

    async fn insert(
        &self,
        identifier: &str,
        first_seen_at: DateTime<Utc>,
        notified: bool,
    ) -> StoreResult<()> {
        let mut records = self.records();
        if records.contains_key(identifier) {
            return Err(StoreError::Conflict(identifier.to_string()));
        }
        records.insert(
            identifier.to_string(),
            SeenRecord {
                identifier: identifier.to_string(),
                first_seen_at,
                notified,
            },
        );
        Ok(())
    }

    async fn mark_notified(&self, identifier: &str) -> StoreResult<()> {
        match self.records().get_mut(identifier) {
            Some(record) => {
                record.notified = true;
                Ok(())
            }
            None => Err(StoreError::NotFound(identifier.to_string())),
        }
    }

    async fn get(&self, identifier: &str) -> StoreResult<Option<SeenRecord>> {
        Ok(self.records().get(identifier).cloned())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.records().len() as u64)
    }

    async fn pending(&self) -> StoreResult<Vec<SeenRecord>> {
        let mut pending: Vec<SeenRecord> = self
            .records()
            .values()
            .filter(|r| !r.notified)
            .cloned()
            .collect();
        pending.sort_by(|a, b| {
            a.first_seen_at
                .cmp(&b.first_seen_at)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        Ok(pending)
    }
}
