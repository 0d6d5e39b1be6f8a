//! Sync outcome notifications.
//!
//! Notifications are best-effort: delivery failures are logged and dropped,
//! never returned to the sync run that triggered them.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::NotifyConfig;

/// The result of one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Success,
    Failure { error: String },
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Success)
    }

    /// The chat message announcing this outcome.
    pub fn message(&self) -> String {
        match self {
            SyncOutcome::Success => "✅ GitBook changelog sync completed successfully".to_string(),
            SyncOutcome::Failure { error } => format!("❌ GitBook sync failed: {error}"),
        }
    }
}

/// Errors delivering a notification. Only ever logged.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("notification endpoint returned HTTP {0}")]
    Status(u16),
}

/// Reports sync outcomes to an external channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers a notification for `outcome`. Must not fail.
    async fn notify(&self, outcome: &SyncOutcome);
}

/// Discards every notification. Used when no endpoint is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, outcome: &SyncOutcome) {
        debug!(success = outcome.is_success(), "No notification endpoint configured");
    }
}

/// Posts `{text, channel}` to a Slack-compatible incoming webhook.
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    http: reqwest::Client,
    webhook_url: String,
    channel: String,
}

#[derive(Serialize)]
struct SlackMessage<'a> {
    text: &'a str,
    channel: &'a str,
}

impl SlackNotifier {
    pub fn new(
        http: reqwest::Client,
        webhook_url: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            http,
            webhook_url: webhook_url.into(),
            channel: channel.into(),
        }
    }

    /// Sends `text`, returning any delivery failure.
    pub async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(&self.webhook_url)
            .json(&SlackMessage {
                text,
                channel: &self.channel,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, outcome: &SyncOutcome) {
        match self.send(&outcome.message()).await {
            Ok(()) => debug!(channel = %self.channel, "Notification sent"),
            Err(e) => warn!(channel = %self.channel, error = %e, "Failed to send notification"),
        }
    }
}

/// Builds the notifier described by `config`.
pub fn from_config(config: &NotifyConfig) -> Box<dyn Notifier> {
    match &config.webhook_url {
        Some(url) => Box::new(SlackNotifier::new(
            reqwest::Client::new(),
            url,
            &config.channel,
        )),
        None => Box::new(NoopNotifier),
    }
}
