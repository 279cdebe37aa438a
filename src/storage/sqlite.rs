//! SQLite record store.
//!
//! One table keyed by identifier. The primary key is what keeps the log
//! append-once: inserts are plain `INSERT`s, so a duplicate from a racing
//! cycle fails with a constraint error that is reported as a conflict.
//!
//! ## Schema
//!
//! ```text
//! seen_bills
//! ├── identifier     TEXT PRIMARY KEY NOT NULL
//! ├── first_seen_at  TEXT NOT NULL      (RFC 3339, UTC)
//! └── notified       INTEGER NOT NULL   (0 / 1)
//! ```

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::DatabaseError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::error::StoreError;
use crate::models::{SeenRecord, StoreConfig};
use crate::storage::{RecordStore, StoreResult};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS seen_bills (
        identifier    TEXT PRIMARY KEY NOT NULL,
        first_seen_at TEXT NOT NULL,
        notified      INTEGER NOT NULL DEFAULT 0
    )
"#;

const SELECT_RECORD: &str = r#"
    SELECT identifier, first_seen_at, notified
    FROM seen_bills
"#;

/// SQLite-backed record store.
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Open (creating if missing) the database and ensure the schema exists.
    pub async fn open(config: &StoreConfig) -> StoreResult<Self> {
        let mut options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(config.busy_timeout_secs));

        if !config.database_url.contains(":memory:") {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // A cycle is sequential; one connection also keeps `:memory:`
        // databases alive for the lifetime of the pool.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self::from_pool(pool);
        store.migrate().await?;

        log::debug!("Opened record store at {}", config.database_url);
        Ok(store)
    }

    /// Wrap an existing pool. Call `migrate` before use.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the `seen_bills` table if it does not exist.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

/// Primary-key and unique violations both mean "already logged".
fn is_duplicate(err: &dyn DatabaseError) -> bool {
    err.is_unique_violation() || err.message().contains("UNIQUE constraint failed")
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn exists(&self, identifier: &str) -> StoreResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM seen_bills WHERE identifier = $1")
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    async fn insert(
        &self,
        identifier: &str,
        first_seen_at: DateTime<Utc>,
        notified: bool,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            "INSERT INTO seen_bills (identifier, first_seen_at, notified) VALUES ($1, $2, $3)",
        )
        .bind(identifier)
        .bind(first_seen_at)
        .bind(notified)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if is_duplicate(e.as_ref()) => {
                Err(StoreError::Conflict(identifier.to_string()))
            }
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    async fn mark_notified(&self, identifier: &str) -> StoreResult<()> {
        let result = sqlx::query("UPDATE seen_bills SET notified = 1 WHERE identifier = $1")
            .bind(identifier)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(identifier.to_string()));
        }
        Ok(())
    }

    async fn get(&self, identifier: &str) -> StoreResult<Option<SeenRecord>> {
        let query = format!("{} WHERE identifier = $1", SELECT_RECORD);
        let row = sqlx::query_as::<_, SeenRow>(&query)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn count(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM seen_bills")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn pending(&self) -> StoreResult<Vec<SeenRecord>> {
        let query = format!(
            "{} WHERE notified = 0 ORDER BY first_seen_at ASC, identifier ASC",
            SELECT_RECORD
        );
        let rows = sqlx::query_as::<_, SeenRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[derive(sqlx::FromRow)]
struct SeenRow {
    identifier: String,
    first_seen_at: DateTime<Utc>,
    notified: bool,
}

impl From<SeenRow> for SeenRecord {
    fn from(row: SeenRow) -> Self {
        SeenRecord {
            identifier: row.identifier,
            first_seen_at: row.first_seen_at,
            notified: row.notified,
        }
    }
}
