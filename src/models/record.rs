//! Persisted record of a bill that has already been logged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the seen-bills log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeenRecord {
    /// Primary key
    pub identifier: String,

    /// When the bill was first detected
    pub first_seen_at: DateTime<Utc>,

    /// Whether the announcement was posted
    pub notified: bool,
}
