//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::is_http_url;

/// Environment variables that override file settings.
pub mod env {
    pub const FEED_URL: &str = "BILLWATCH_FEED_URL";
    pub const DATABASE_URL: &str = "BILLWATCH_DATABASE_URL";
    pub const WEBHOOK_URL: &str = "BILLWATCH_WEBHOOK_URL";
    pub const WEBHOOK_TOKEN: &str = "BILLWATCH_WEBHOOK_TOKEN";
    pub const TIMEOUT_SECS: &str = "BILLWATCH_TIMEOUT_SECS";
}

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Feed source settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Record store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Posting backend and message format
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Poll cycle behavior
    #[serde(default)]
    pub cycle: CycleConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply `BILLWATCH_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(env::FEED_URL) {
            self.feed.url = url;
        }
        if let Some(url) = lookup(env::DATABASE_URL) {
            self.store.database_url = url;
        }
        if let Some(url) = lookup(env::WEBHOOK_URL) {
            self.notifier.webhook_url = Some(url);
            self.notifier.kind = NotifierKind::Webhook;
        }
        if let Some(token) = lookup(env::WEBHOOK_TOKEN) {
            self.notifier.token = Some(token);
        }
        if let Some(timeout) = lookup(env::TIMEOUT_SECS) {
            match timeout.parse() {
                Ok(secs) => {
                    self.feed.timeout_secs = secs;
                    self.notifier.timeout_secs = secs;
                }
                Err(_) => log::warn!("Ignoring non-numeric {}={}", env::TIMEOUT_SECS, timeout),
            }
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.feed.user_agent.trim().is_empty() {
            return Err(AppError::validation("feed.user_agent is empty"));
        }
        if !is_http_url(&self.feed.url) {
            return Err(AppError::validation(format!(
                "feed.url is not an http(s) URL: {}",
                self.feed.url
            )));
        }
        if self.feed.timeout_secs == 0 {
            return Err(AppError::validation("feed.timeout_secs must be > 0"));
        }
        if self.store.database_url.trim().is_empty() {
            return Err(AppError::validation("store.database_url is empty"));
        }
        if self.notifier.timeout_secs == 0 {
            return Err(AppError::validation("notifier.timeout_secs must be > 0"));
        }
        if self.notifier.kind == NotifierKind::Webhook {
            match self.notifier.webhook_url.as_deref() {
                Some(url) if is_http_url(url) => {}
                Some(url) => {
                    return Err(AppError::validation(format!(
                        "notifier.webhook_url is not an http(s) URL: {url}"
                    )));
                }
                None => {
                    return Err(AppError::validation(
                        "notifier.kind = \"webhook\" requires notifier.webhook_url",
                    ));
                }
            }
        }
        if !self.notifier.template.contains("{title}") && !self.notifier.template.contains("{link}")
        {
            return Err(AppError::validation(
                "notifier.template must reference {title} or {link}",
            ));
        }
        Ok(())
    }
}

/// Feed source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// RSS/Atom feed to poll
    #[serde(default = "defaults::feed_url")]
    pub url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::feed_timeout")]
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: defaults::feed_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::feed_timeout(),
        }
    }
}

/// Record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite connection string
    #[serde(default = "defaults::database_url")]
    pub database_url: String,

    /// How long a writer waits on a locked database, in seconds
    #[serde(default = "defaults::busy_timeout")]
    pub busy_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: defaults::database_url(),
            busy_timeout_secs: defaults::busy_timeout(),
        }
    }
}

/// Which posting backend receives announcements.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotifierKind {
    /// Write announcements to the log only
    #[default]
    Log,
    /// POST announcements to an HTTP endpoint
    Webhook,
}

/// Posting backend and message format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub kind: NotifierKind,

    /// Endpoint for the webhook backend
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Bearer token for the webhook backend
    #[serde(default)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "defaults::notifier_timeout")]
    pub timeout_secs: u64,

    /// Message template, see `BillEntry::format` for placeholders
    #[serde(default = "defaults::template")]
    pub template: String,

    /// Maximum message length in characters (0 = unlimited)
    #[serde(default = "defaults::max_length")]
    pub max_length: usize,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            kind: NotifierKind::default(),
            webhook_url: None,
            token: None,
            timeout_secs: defaults::notifier_timeout(),
            template: defaults::template(),
            max_length: defaults::max_length(),
        }
    }
}

/// Order in which new entries are logged and announced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingOrder {
    /// As returned by the feed (most recent first)
    #[default]
    Feed,
    /// Reverse feed order, so announcements read chronologically
    OldestFirst,
}

/// Poll cycle behavior.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CycleConfig {
    #[serde(default)]
    pub order: ProcessingOrder,
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Feed defaults
    pub fn feed_url() -> String {
        "https://www.congress.gov/rss".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; billwatch/0.1)".into()
    }
    pub fn feed_timeout() -> u64 {
        30
    }

    // Store defaults
    pub fn database_url() -> String {
        "sqlite://bills.db".into()
    }
    pub fn busy_timeout() -> u64 {
        5
    }

    // Notifier defaults
    pub fn notifier_timeout() -> u64 {
        15
    }
    pub fn template() -> String {
        "New bill introduced: {title}\nSponsor: {sponsor}\nIntroduced: {published}\n{link}".into()
    }
    pub fn max_length() -> usize {
        280
    }

    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.feed.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.feed.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_relative_feed_url() {
        let mut config = Config::default();
        config.feed.url = "congress.gov/rss".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_webhook_requires_url() {
        let mut config = Config::default();
        config.notifier.kind = NotifierKind::Webhook;
        assert!(config.validate().is_err());

        config.notifier.webhook_url = Some("https://hooks.example.com/post".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_template_without_content() {
        let mut config = Config::default();
        config.notifier.template = "New bill!".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn parse_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [feed]
            url = "https://example.com/bills.xml"

            [notifier]
            kind = "webhook"
            webhook_url = "https://hooks.example.com/post"

            [cycle]
            order = "oldest_first"
            "#,
        )
        .unwrap();

        assert_eq!(config.feed.url, "https://example.com/bills.xml");
        assert_eq!(config.feed.timeout_secs, 30);
        assert_eq!(config.store.database_url, "sqlite://bills.db");
        assert_eq!(config.notifier.kind, NotifierKind::Webhook);
        assert_eq!(config.notifier.max_length, 280);
        assert_eq!(config.cycle.order, ProcessingOrder::OldestFirst);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_replace_file_settings() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (env::FEED_URL, "https://example.com/other.xml"),
            (env::WEBHOOK_URL, "https://hooks.example.com/post"),
            (env::WEBHOOK_TOKEN, "secret"),
            (env::TIMEOUT_SECS, "7"),
        ]);

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.feed.url, "https://example.com/other.xml");
        assert_eq!(config.notifier.kind, NotifierKind::Webhook);
        assert_eq!(config.notifier.token.as_deref(), Some("secret"));
        assert_eq!(config.feed.timeout_secs, 7);
        assert_eq!(config.notifier.timeout_secs, 7);
        assert_eq!(config.store.database_url, "sqlite://bills.db");
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let config = Config::load_or_default("/nonexistent/billwatch.toml");
        assert_eq!(config.feed.url, "https://www.congress.gov/rss");
    }
}
