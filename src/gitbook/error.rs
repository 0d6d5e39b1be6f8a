//! GitBook API error types.

use thiserror::Error;

/// A failed page update.
#[derive(Debug, Error)]
pub enum GitBookApiError {
    /// GitBook answered with a non-success status.
    #[error("GitBook API error: {status_text} (HTTP {status_code})")]
    Status {
        status_code: u16,
        /// The HTTP reason phrase, e.g. `Not Found`.
        status_text: String,
    },

    /// The request never produced a response (connection, TLS, body encoding).
    #[error("GitBook request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl GitBookApiError {
    pub(crate) fn from_status(status: reqwest::StatusCode) -> Self {
        let status_text = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_str().to_string());
        Self::Status {
            status_code: status.as_u16(),
            status_text,
        }
    }

    /// The HTTP status code, if GitBook responded.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status_code, .. } => Some(*status_code),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }
}
