//! Changelog sync orchestration.
//!
//! One run loads the dataset, publishes every version page in dataset order,
//! then publishes the summary page. Runs are sequential and stop at the first
//! failed update: no retry, no rollback of pages already written.
//!
//! Runs are not coordinated with each other. Two runs started close together
//! execute concurrently and whichever writes a page last wins, even if it
//! loaded an older dataset.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::changelog::{ChangelogDataset, DEFAULT_PAGE_ID, DatasetError, format_summary, format_version};
use crate::config::Config;
use crate::convert::Converter;
use crate::gitbook::{DocumentHost, GitBookApiError, GitBookClient};
use crate::notify::{self, Notifier, SyncOutcome};

/// Errors that abort a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("failed to update page {page_id}: {source}")]
    Host {
        page_id: String,
        #[source]
        source: GitBookApiError,
    },
}

/// Pages written by a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Page ids in the order they were updated.
    pub pages: Vec<String>,
}

/// Publishes the changelog dataset to a documentation host.
pub struct SyncOrchestrator {
    host: Arc<dyn DocumentHost>,
    notifier: Arc<dyn Notifier>,
    converter: Converter,
    dataset_path: PathBuf,
}

impl SyncOrchestrator {
    pub fn new(
        host: Arc<dyn DocumentHost>,
        notifier: Arc<dyn Notifier>,
        converter: Converter,
        dataset_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            host,
            notifier,
            converter,
            dataset_path: dataset_path.into(),
        }
    }

    /// Wires the GitBook client, configured notifier and GitBook conversion rules.
    pub fn from_config(config: &Config) -> Result<Self, GitBookApiError> {
        let host = GitBookClient::from_config(&config.gitbook)?;
        Ok(Self::new(
            Arc::new(host),
            Arc::from(notify::from_config(&config.notify)),
            Converter::gitbook(),
            &config.changelog_path,
        ))
    }

    /// Runs one sync and reports the outcome through the notifier.
    ///
    /// This is the unit spawned for each accepted webhook. The error, if any,
    /// is logged and notified here; nothing is returned to the webhook caller.
    pub async fn run(&self) -> SyncOutcome {
        let outcome = match self.sync_changelog().await {
            Ok(report) => {
                info!(pages = report.pages.len(), "Changelog sync completed");
                SyncOutcome::Success
            }
            Err(e) => {
                error!(error = %e, "Changelog sync failed");
                SyncOutcome::Failure {
                    error: e.to_string(),
                }
            }
        };
        self.notifier.notify(&outcome).await;
        outcome
    }

    /// Loads the dataset and publishes every page, stopping at the first error.
    pub async fn sync_changelog(&self) -> Result<SyncReport, SyncError> {
        let dataset = ChangelogDataset::load(&self.dataset_path)?;
        info!(
            path = %self.dataset_path.display(),
            versions = dataset.versions.len(),
            "Syncing changelog to GitBook"
        );

        let mut report = SyncReport::default();

        for version in &dataset.versions {
            let page_id = version.target_page();
            let document = self.converter.convert(&format_version(version));
            self.update(page_id, &document).await?;
            info!(version = %version.version, page_id, "Updated version page");
            report.pages.push(page_id.to_string());
        }

        let summary = self
            .converter
            .convert(&format_summary(&dataset, Utc::now().date_naive()));
        self.update(DEFAULT_PAGE_ID, &summary).await?;
        report.pages.push(DEFAULT_PAGE_ID.to_string());

        Ok(report)
    }

    async fn update(&self, page_id: &str, document: &str) -> Result<(), SyncError> {
        self.host
            .update_page(page_id, document)
            .await
            .map_err(|source| {
                warn!(page_id, status = ?source.status_code(), "Page update rejected");
                SyncError::Host {
                    page_id: page_id.to_string(),
                    source,
                }
            })
    }
}

impl std::fmt::Debug for SyncOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncOrchestrator")
            .field("converter", &self.converter)
            .field("dataset_path", &self.dataset_path)
            .finish_non_exhaustive()
    }
}
