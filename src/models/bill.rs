//! Bill entry data structure.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::bill::{congress_for_year, extract_bill_number, extract_sponsor, ordinal};

/// A candidate legislative item read from the feed.
///
/// Equality and hashing look only at `identifier`: feeds revise titles and
/// descriptions of an item they already published, and those revisions are
/// the same bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillEntry {
    /// Stable key derived from the feed guid or permanent link
    pub identifier: String,

    /// Human-readable description
    pub title: String,

    /// Publish time reported by the feed, if present and parsable
    pub published_at: Option<DateTime<Utc>>,

    /// Canonical page for the bill
    pub source_link: String,

    /// Feed summary text, whitespace-normalized (may be empty)
    #[serde(default)]
    pub description: String,
}

impl BillEntry {
    /// Bill number found in the title, e.g. `H.R. 1234`.
    pub fn bill_number(&self) -> Option<String> {
        extract_bill_number(&self.title)
    }

    /// Publish date as `YYYY-MM-DD`, or `Unknown`.
    pub fn published_date(&self) -> String {
        self.published_at
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Sponsoring member, from the description or failing that the title.
    pub fn sponsor(&self) -> Option<String> {
        extract_sponsor(&self.description, &self.title)
    }

    /// Congress in session at publish time, e.g. `119th Congress`.
    pub fn congress(&self) -> Option<String> {
        let year = self.published_at?.year();
        let number = congress_for_year(year)?;
        Some(format!("{} Congress", ordinal(number)))
    }

    /// Format entry for display using a template.
    ///
    /// Supported placeholders:
    /// - `{title}`, `{link}`, `{id}`, `{published}`
    /// - `{bill_number}`, `{congress}` (empty when unknown)
    /// - `{sponsor}` (`Unknown` when not found)
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{bill_number}", &self.bill_number().unwrap_or_default())
            .replace("{congress}", &self.congress().unwrap_or_default())
            .replace(
                "{sponsor}",
                &self.sponsor().unwrap_or_else(|| "Unknown".to_string()),
            )
            .replace("{published}", &self.published_date())
            .replace("{id}", &self.identifier)
            .replace("{link}", &self.source_link)
            .replace("{title}", &self.title)
    }
}

impl PartialEq for BillEntry {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for BillEntry {}

impl Hash for BillEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}
