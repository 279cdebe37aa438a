// src/services/notifier.rs

//! Notifier adapter.
//!
//! Formats a new bill into an announcement and hands it to a posting
//! backend. Backend failures (rate limits, network, credentials) come back
//! as a `Delivery::Failed` value; nothing raised by a backend crosses this
//! module.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::{NotifyError, Result};
use crate::models::{BillEntry, NotifierConfig, NotifierKind};
use crate::utils::http;

const ELLIPSIS: &str = "...";

/// A formatted announcement.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub link: String,
}

/// Posting backend capability.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Post one message. Not assumed to be idempotent.
    async fn post(&self, message: &Message) -> std::result::Result<(), NotifyError>;
}

/// Outcome of a single announcement attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Failed(String),
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered)
    }
}

/// Renders bill entries into messages with a length limit.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    template: String,
    max_length: usize,
}

impl MessageTemplate {
    /// `max_length` of 0 disables truncation.
    pub fn new(template: impl Into<String>, max_length: usize) -> Self {
        Self {
            template: template.into(),
            max_length,
        }
    }

    /// Render an entry, shortening the title first so the link survives.
    pub fn render(&self, entry: &BillEntry) -> Message {
        let text = entry.format(&self.template);
        let message = |text: String| Message {
            text,
            link: entry.source_link.clone(),
        };

        let length = text.chars().count();
        if self.max_length == 0 || length <= self.max_length {
            return message(text);
        }

        let overflow = length - self.max_length;
        let title_length = entry.title.chars().count();
        if self.template.contains("{title}") && title_length > overflow + ELLIPSIS.len() {
            let keep = title_length - overflow - ELLIPSIS.len();
            let mut shortened = entry.clone();
            shortened.title = format!("{}{}", take_chars(&entry.title, keep).trim_end(), ELLIPSIS);

            let text = shortened.format(&self.template);
            if text.chars().count() <= self.max_length {
                return message(text);
            }
        }

        let text = if self.max_length > ELLIPSIS.len() {
            format!(
                "{}{}",
                take_chars(&text, self.max_length - ELLIPSIS.len()),
                ELLIPSIS
            )
        } else {
            take_chars(&text, self.max_length).to_string()
        };
        message(text)
    }
}

fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Writes announcements to the log instead of posting them.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn post(&self, message: &Message) -> std::result::Result<(), NotifyError> {
        log::info!("Announcement:\n{}", message.text);
        Ok(())
    }
}

/// Posts announcements as JSON to an HTTP endpoint.
pub struct WebhookNotifier {
    client: Client,
    url: String,
    token: Option<String>,
}

impl WebhookNotifier {
    pub fn new(client: Client, url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            token,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn post(&self, message: &Message) -> std::result::Result<(), NotifyError> {
        let mut request = self.client.post(&self.url).json(message);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status));
        }
        Ok(())
    }
}

/// Formats entries and hands them to a posting backend.
pub struct NotifierAdapter {
    notifier: Box<dyn Notifier>,
    template: MessageTemplate,
}

impl NotifierAdapter {
    pub fn new(notifier: Box<dyn Notifier>, template: MessageTemplate) -> Self {
        Self { notifier, template }
    }

    /// Build the adapter and backend described by the configuration.
    pub fn from_config(config: &NotifierConfig) -> Result<Self> {
        let template = MessageTemplate::new(config.template.clone(), config.max_length);
        let notifier: Box<dyn Notifier> = match config.kind {
            NotifierKind::Log => Box::new(LogNotifier),
            NotifierKind::Webhook => {
                let url = config.webhook_url.clone().ok_or_else(|| {
                    NotifyError::NotConfigured("webhook_url is not set".to_string())
                })?;
                let user_agent = format!(
                    "{}/{}",
                    env!("CARGO_PKG_NAME"),
                    env!("CARGO_PKG_VERSION")
                );
                let client = http::create_async_client(&user_agent, config.timeout_secs)?;
                Box::new(WebhookNotifier::new(client, url, config.token.clone()))
            }
        };
        Ok(Self::new(notifier, template))
    }

    /// Announce one entry. Never fails; failures are reported as values.
    pub async fn notify(&self, entry: &BillEntry) -> Delivery {
        let message = self.template.render(entry);
        match self.notifier.post(&message).await {
            Ok(()) => {
                log::debug!("Posted {} via {}", entry.identifier, self.notifier.name());
                Delivery::Delivered
            }
            Err(e) => {
                log::warn!(
                    "Failed to post {} via {}: {}",
                    entry.identifier,
                    self.notifier.name(),
                    e
                );
                Delivery::Failed(e.to_string())
            }
        }
    }
}
