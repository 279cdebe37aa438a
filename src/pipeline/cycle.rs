// src/pipeline/cycle.rs

//! Poll cycle orchestration.
//!
//! One cycle is fetch → filter → persist → notify. A fetch failure aborts
//! the cycle before anything is written. Every later failure is scoped to
//! one entry and the cycle moves on to the next.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Result, StoreError};
use crate::models::{BillEntry, Config, ProcessingOrder};
use crate::pipeline::novelty::find_new;
use crate::services::{Delivery, FeedFetcher, NotifierAdapter, RssFeedFetcher};
use crate::storage::{RecordStore, SqliteRecordStore};

/// Summary of one poll cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Entries returned by the feed
    pub fetched: usize,
    /// Entries already in the store
    pub already_seen: usize,
    /// Repeated identifiers within the fetched batch
    pub batch_duplicates: usize,
    /// Entries the novelty filter reported as new
    pub new: usize,
    /// New entries persisted this cycle
    pub logged: usize,
    /// Announcements delivered
    pub notified: usize,
    /// Inserts rejected because another run logged the bill first
    pub conflicts: usize,
    /// Inserts that failed for any other reason
    pub persist_failures: usize,
    /// Logged bills whose announcement failed
    pub failed_notifications: Vec<String>,
    /// Unexpected store states, e.g. a record missing at mark time
    pub anomalies: Vec<String>,
}

impl CycleReport {
    /// Whether every new entry was both logged and announced.
    pub fn is_clean(&self) -> bool {
        self.conflicts == 0
            && self.persist_failures == 0
            && self.failed_notifications.is_empty()
            && self.anomalies.is_empty()
    }

    fn log_summary(&self) {
        let elapsed = self.finished_at - self.started_at;
        log::info!(
            "Cycle complete in {}ms: {} fetched, {} new, {} logged, {} notified, {} conflicts, {} persist failures",
            elapsed.num_milliseconds(),
            self.fetched,
            self.new,
            self.logged,
            self.notified,
            self.conflicts,
            self.persist_failures
        );
        if !self.failed_notifications.is_empty() {
            log::warn!(
                "Logged without announcement ({}): {}",
                self.failed_notifications.len(),
                self.failed_notifications.join(", ")
            );
        }
    }
}

/// One fetch-filter-persist-notify pass over borrowed collaborators.
pub struct PollCycle<'a> {
    fetcher: &'a dyn FeedFetcher,
    store: &'a dyn RecordStore,
    notifier: &'a NotifierAdapter,
    order: ProcessingOrder,
}

impl<'a> PollCycle<'a> {
    pub fn new(
        fetcher: &'a dyn FeedFetcher,
        store: &'a dyn RecordStore,
        notifier: &'a NotifierAdapter,
    ) -> Self {
        Self {
            fetcher,
            store,
            notifier,
            order: ProcessingOrder::default(),
        }
    }

    /// Set the order in which new entries are logged and announced.
    pub fn with_order(mut self, order: ProcessingOrder) -> Self {
        self.order = order;
        self
    }

    /// Run the cycle.
    ///
    /// Returns an error only when the feed cannot be fetched or the store
    /// cannot be read while filtering; in both cases nothing was written.
    pub async fn run(&self) -> Result<CycleReport> {
        let started_at = Utc::now();

        let entries = self.fetcher.fetch().await.inspect_err(|e| {
            log::error!("Feed fetch failed, aborting cycle: {}", e);
        })?;

        let novelty = find_new(&entries, self.store).await?;
        if novelty.has_new() {
            log::info!(
                "Fetched {} entries, {} new",
                entries.len(),
                novelty.new_entries.len()
            );
        } else {
            log::info!("No new bills in {} fetched entries", entries.len());
        }

        let mut new_entries = novelty.new_entries;
        if self.order == ProcessingOrder::OldestFirst {
            new_entries.reverse();
        }

        let mut report = CycleReport {
            started_at,
            fetched: entries.len(),
            already_seen: novelty.already_seen,
            batch_duplicates: novelty.batch_duplicates,
            new: new_entries.len(),
            ..CycleReport::default()
        };

        for entry in &new_entries {
            self.process_entry(entry, &mut report).await;
        }

        report.finished_at = Utc::now();
        report.log_summary();
        Ok(report)
    }

    /// Persist then announce a single new entry.
    async fn process_entry(&self, entry: &BillEntry, report: &mut CycleReport) {
        let id = entry.identifier.as_str();

        // No durable record, no announcement.
        match self.store.insert(id, Utc::now(), false).await {
            Ok(()) => report.logged += 1,
            Err(StoreError::Conflict(_)) => {
                report.conflicts += 1;
                log::warn!("Bill {} was logged by another run; skipping", id);
                return;
            }
            Err(e) => {
                report.persist_failures += 1;
                log::error!("Failed to log bill {}: {}", id, e);
                return;
            }
        }

        log::info!(
            "New bill logged: {} ({})",
            entry.bill_number().unwrap_or_else(|| entry.title.clone()),
            id
        );

        match self.notifier.notify(entry).await {
            Delivery::Delivered => {
                report.notified += 1;
                if let Err(e) = self.store.mark_notified(id).await {
                    log::error!("Announced {} but could not mark it notified: {}", id, e);
                    report.anomalies.push(format!("{}: {}", id, e));
                }
            }
            Delivery::Failed(reason) => {
                log::warn!("Bill {} stays logged without announcement: {}", id, reason);
                report.failed_notifications.push(id.to_string());
            }
        }
    }
}

/// Run one cycle with collaborators built from configuration.
///
/// The record store is opened for the duration of the cycle and closed on
/// every exit path.
pub async fn run_once(config: &Config) -> Result<CycleReport> {
    let fetcher = RssFeedFetcher::new(&config.feed)?;
    let notifier = NotifierAdapter::from_config(&config.notifier)?;
    let store = SqliteRecordStore::open(&config.store).await?;

    let result = PollCycle::new(&fetcher, &store, &notifier)
        .with_order(config.cycle.order)
        .run()
        .await;

    store.close().await;
    result
}
