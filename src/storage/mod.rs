//! Record store for bills that have already been logged.
//!
//! The store is the only source of truth for novelty: an identifier is new
//! exactly when no record for it exists. Records are append-only and each
//! backend enforces identifier uniqueness itself, so two overlapping cycles
//! cannot both log (and announce) the same bill.
//!
//! ## Lifecycle of a record
//!
//! ```text
//! Unseen ── insert(notified = false) ──▶ Logged(false) ── mark_notified ──▶ Logged(true)
//! ```

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::models::SeenRecord;

// Re-export for convenience
pub use memory::MemoryRecordStore;
pub use sqlite::SqliteRecordStore;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Trait for seen-bill storage backends.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Whether a record with this identifier exists. Read-only.
    async fn exists(&self, identifier: &str) -> StoreResult<bool>;

    /// Log a bill. Fails with `StoreError::Conflict` if already present.
    async fn insert(
        &self,
        identifier: &str,
        first_seen_at: DateTime<Utc>,
        notified: bool,
    ) -> StoreResult<()>;

    /// Mark a logged bill as announced. Idempotent; fails with
    /// `StoreError::NotFound` if the identifier was never logged.
    async fn mark_notified(&self, identifier: &str) -> StoreResult<()>;

    /// Look up a single record.
    async fn get(&self, identifier: &str) -> StoreResult<Option<SeenRecord>>;

    /// Total number of logged bills.
    async fn count(&self) -> StoreResult<u64>;

    /// Logged bills whose announcement did not go out, oldest first.
    async fn pending(&self) -> StoreResult<Vec<SeenRecord>>;

    /// Release the underlying resources.
    async fn close(&self) {}
}
