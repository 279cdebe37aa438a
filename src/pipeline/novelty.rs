//! Novelty filter.
//!
//! Decides which fetched entries have never been logged. The record store
//! is consulted read-only; nothing here writes to it.

use std::collections::HashSet;

use crate::models::BillEntry;
use crate::storage::{RecordStore, StoreResult};

/// Entries that still need to be logged, plus what was dropped.
#[derive(Debug, Clone, Default)]
pub struct NoveltyResult {
    /// Unseen entries in input order
    pub new_entries: Vec<BillEntry>,
    /// Entries already present in the store
    pub already_seen: usize,
    /// Repeats of an identifier earlier in the same batch
    pub batch_duplicates: usize,
}

impl NoveltyResult {
    pub fn has_new(&self) -> bool {
        !self.new_entries.is_empty()
    }
}

/// Filter `entries` down to the ones the store has not seen.
///
/// Input order is preserved, and an identifier repeated within the batch
/// is kept only at its first occurrence.
pub async fn find_new(
    entries: &[BillEntry],
    store: &dyn RecordStore,
) -> StoreResult<NoveltyResult> {
    let mut result = NoveltyResult::default();
    let mut batch_ids: HashSet<&str> = HashSet::new();

    for entry in entries {
        if !batch_ids.insert(entry.identifier.as_str()) {
            result.batch_duplicates += 1;
            log::debug!("Duplicate entry in feed batch: {}", entry.identifier);
            continue;
        }

        if store.exists(&entry.identifier).await? {
            result.already_seen += 1;
        } else {
            result.new_entries.push(entry.clone());
        }
    }

    Ok(result)
}

/// Convenience wrapper returning only the new entries.
pub async fn filter_new(
    entries: &[BillEntry],
    store: &dyn RecordStore,
) -> StoreResult<Vec<BillEntry>> {
    Ok(find_new(entries, store).await?.new_entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryRecordStore;
    use chrono::Utc;

    fn make_entry(id: &str, title: &str) -> BillEntry {
        BillEntry {
            identifier: id.to_string(),
            title: title.to_string(),
            published_at: None,
            source_link: format!("https://example.gov/{}", id),
            description: String::new(),
        }
    }

    fn ids(entries: &[BillEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.identifier.as_str()).collect()
    }

    #[tokio::test]
    async fn test_empty_input() {
        let store = MemoryRecordStore::new();
        let result = filter_new(&[], &store).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_preserves_feed_order() {
        let store = MemoryRecordStore::new();
        let entries = vec![
            make_entry("B3", "Third"),
            make_entry("B1", "First"),
            make_entry("B2", "Second"),
        ];

        let result = filter_new(&entries, &store).await.unwrap();
        assert_eq!(ids(&result), vec!["B3", "B1", "B2"]);
    }

    #[tokio::test]
    async fn test_skips_seen_entries() {
        let store = MemoryRecordStore::new();
        store.insert("B1", Utc::now(), true).await.unwrap();

        let entries = vec![make_entry("B2", "New"), make_entry("B1", "Old, retitled")];
        let result = find_new(&entries, &store).await.unwrap();

        assert_eq!(ids(&result.new_entries), vec!["B2"]);
        assert_eq!(result.already_seen, 1);
        assert!(result.has_new());
    }

    #[tokio::test]
    async fn test_all_seen_has_nothing_new() {
        let store = MemoryRecordStore::new();
        store.insert("B1", Utc::now(), true).await.unwrap();

        let result = find_new(&[make_entry("B1", "Old")], &store).await.unwrap();
        assert!(!result.has_new());
        assert_eq!(result.already_seen, 1);
    }

    #[tokio::test]
    async fn test_batch_duplicates_first_wins() {
        let store = MemoryRecordStore::new();
        let entries = vec![
            make_entry("B1", "First copy"),
            make_entry("B1", "Second copy"),
            make_entry("B2", "Other"),
        ];

        let result = find_new(&entries, &store).await.unwrap();
        assert_eq!(ids(&result.new_entries), vec!["B1", "B2"]);
        assert_eq!(result.new_entries[0].title, "First copy");
        assert_eq!(result.batch_duplicates, 1);
    }

    #[tokio::test]
    async fn test_does_not_write_store() {
        let store = MemoryRecordStore::new();
        let entries = vec![make_entry("B1", "One"), make_entry("B2", "Two")];

        filter_new(&entries, &store).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
