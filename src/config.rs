//! Process configuration.
//!
//! Built once at startup from environment variables and handed to component
//! constructors. Nothing else in the crate reads the environment.

use std::path::PathBuf;

use thiserror::Error;

use crate::gitbook::DEFAULT_API_URL;
use crate::webhooks::DEFAULT_PRIMARY_BRANCH_REF;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CHANGELOG_PATH: &str = "./changelog-extract.json";
pub const DEFAULT_NOTIFY_CHANNEL: &str = "#dev-notifications";

/// Errors building configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Full service configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Shared secret for webhook signatures. Only the server needs it.
    pub webhook_secret: Option<String>,
    pub gitbook: GitBookConfig,
    pub notify: NotifyConfig,
    pub port: u16,
    /// Location of the extracted changelog artifact.
    pub changelog_path: PathBuf,
    /// Only pushes to this exact ref trigger a sync.
    pub primary_branch_ref: String,
}

/// Documentation host settings.
#[derive(Clone, PartialEq, Eq)]
pub struct GitBookConfig {
    pub api_token: String,
    pub space_id: String,
    pub api_url: String,
}

/// Outbound notification settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
    /// Incoming-webhook URL; `None` disables notifications.
    pub webhook_url: Option<String>,
    pub channel: String,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            webhook_secret: get("GITHUB_WEBHOOK_SECRET"),
            gitbook: GitBookConfig {
                api_token: require("GITBOOK_API_TOKEN")?,
                space_id: require("GITBOOK_SPACE_ID")?,
                api_url: get("GITBOOK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            },
            notify: NotifyConfig {
                webhook_url: get("SLACK_WEBHOOK_URL"),
                channel: get("SLACK_CHANNEL").unwrap_or_else(|| DEFAULT_NOTIFY_CHANNEL.to_string()),
            },
            port,
            changelog_path: get("CHANGELOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CHANGELOG_PATH)),
            primary_branch_ref: get("PRIMARY_BRANCH_REF")
                .unwrap_or_else(|| DEFAULT_PRIMARY_BRANCH_REF.to_string()),
        })
    }

    /// The webhook secret, required when serving webhooks.
    pub fn require_webhook_secret(&self) -> Result<&str, ConfigError> {
        self.webhook_secret
            .as_deref()
            .ok_or(ConfigError::Missing("GITHUB_WEBHOOK_SECRET"))
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("gitbook", &self.gitbook)
            .field("notify", &self.notify)
            .field("port", &self.port)
            .field("changelog_path", &self.changelog_path)
            .field("primary_branch_ref", &self.primary_branch_ref)
            .finish()
    }
}

impl std::fmt::Debug for GitBookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitBookConfig")
            .field("space_id", &self.space_id)
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}
