//! reqwest-based GitBook client scoped to one space.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::{DocumentHost, GitBookApiError};
use crate::config::GitBookConfig;

/// Base URL of the public GitBook API.
pub const DEFAULT_API_URL: &str = "https://api.gitbook.com/v1";

/// A GitBook API client scoped to a single space.
///
/// The underlying HTTP client has no request timeout: a hung request stalls
/// the sync run that issued it.
#[derive(Clone)]
pub struct GitBookClient {
    http: reqwest::Client,
    base_url: String,
    space_id: String,
    api_token: String,
}

#[derive(Serialize)]
struct PageUpdate<'a> {
    document: PageDocument<'a>,
}

#[derive(Serialize)]
struct PageDocument<'a> {
    nodes: &'a str,
}

impl GitBookClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        space_id: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            space_id: space_id.into(),
            api_token: api_token.into(),
        }
    }

    /// Builds a client with a fresh connection pool from configuration.
    pub fn from_config(config: &GitBookConfig) -> Result<Self, GitBookApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("changelog-sync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::new(
            http,
            &config.api_url,
            &config.space_id,
            &config.api_token,
        ))
    }

    fn page_url(&self, page_id: &str) -> String {
        format!(
            "{}/spaces/{}/content/pages/{}",
            self.base_url, self.space_id, page_id
        )
    }
}

#[async_trait]
impl DocumentHost for GitBookClient {
    async fn update_page(&self, page_id: &str, document: &str) -> Result<(), GitBookApiError> {
        let url = self.page_url(page_id);
        debug!(page_id, url = %url, bytes = document.len(), "Updating GitBook page");

        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.api_token)
            .json(&PageUpdate {
                document: PageDocument { nodes: document },
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GitBookApiError::from_status(status));
        }
        Ok(())
    }
}

impl std::fmt::Debug for GitBookClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitBookClient")
            .field("base_url", &self.base_url)
            .field("space_id", &self.space_id)
            .finish_non_exhaustive()
    }
}
