// src/error.rs

//! Error types for the bill watcher.
//!
//! Each boundary has its own error enum so callers can tell which failures
//! abort a cycle (`FetchError`) and which are scoped to one entry
//! (`StoreError::Conflict`, `StoreError::NotFound`, `NotifyError`).

use thiserror::Error;

/// Result type alias for application operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// The feed could not be retrieved or was entirely unparsable.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network failure, including timeouts
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed responded with a non-success status
    #[error("HTTP {status} when fetching {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// Body is not a syndication feed
    #[error("Failed to parse feed: {0}")]
    Parse(String),
}

/// Record store failures.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Identifier already logged
    #[error("Record already exists: {0}")]
    Conflict(String),

    /// Identifier was never logged
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Posting backend failures. These never cross the notifier adapter.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Network failure, including timeouts
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend rejected the post (rate limit, credentials, ...)
    #[error("Posting backend responded with HTTP {0}")]
    Status(reqwest::StatusCode),

    /// Backend is missing required settings
    #[error("Notifier not configured: {0}")]
    NotConfigured(String),
}

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Feed fetch failed; the cycle was aborted
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Record store failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Notifier could not be built
    #[error("Notifier error: {0}")]
    Notify(#[from] NotifyError),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Store(StoreError::Database(err))
    }
}
