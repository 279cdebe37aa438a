//! Service layer for the bill watcher.
//!
//! - Feed retrieval and parsing (`RssFeedFetcher`, `parse_feed`)
//! - Announcements (`NotifierAdapter` over a `Notifier` backend)

pub mod feed;
pub mod notifier;
pub mod rss;

pub use feed::{FeedFetcher, RssFeedFetcher};
pub use notifier::{
    Delivery, LogNotifier, Message, MessageTemplate, Notifier, NotifierAdapter, WebhookNotifier,
};
pub use rss::parse_feed;
