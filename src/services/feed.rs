// src/services/feed.rs

//! Feed fetcher service.
//!
//! Retrieves the configured feed over HTTP and parses it into bill entries.
//! Every call goes to the network; nothing is cached between cycles.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{FetchError, Result};
use crate::models::{BillEntry, FeedConfig};
use crate::services::rss::parse_feed;
use crate::utils::http;

/// Source of candidate bill entries.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch the feed, returning entries in feed order (most recent first).
    async fn fetch(&self) -> std::result::Result<Vec<BillEntry>, FetchError>;
}

/// Fetches an RSS or Atom feed over HTTP.
pub struct RssFeedFetcher {
    client: Client,
    url: String,
}

impl RssFeedFetcher {
    /// Create a fetcher with its own client built from the feed settings.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = http::create_async_client(&config.user_agent, config.timeout_secs)?;
        Ok(Self::with_client(client, &config.url))
    }

    /// Create a fetcher around an existing client.
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl FeedFetcher for RssFeedFetcher {
    async fn fetch(&self) -> std::result::Result<Vec<BillEntry>, FetchError> {
        log::debug!("Fetching feed from {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: self.url.clone(),
            });
        }

        let bytes = response.bytes().await?;
        let entries = parse_feed(&bytes)?;

        log::debug!("Parsed {} entries from {}", entries.len(), self.url);
        Ok(entries)
    }
}
