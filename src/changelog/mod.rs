//! Changelog dataset consumed by the sync pipeline.
//!
//! The dataset is produced by an external extraction step and written to a
//! JSON artifact (`changelog-extract.json` by default). Versions are expected
//! newest-first; nothing here re-sorts them.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod format;

pub use format::{format_summary, format_version};

/// Page that receives the summary and any version without its own page.
pub const DEFAULT_PAGE_ID: &str = "changelog";

/// Errors loading or validating a changelog dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read changelog data from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse changelog data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate changelog version: {0}")]
    DuplicateVersion(String),

    #[error("version {version} has an invalid release date {date:?} (expected YYYY-MM-DD)")]
    InvalidDate { version: String, date: String },
}

/// All released versions, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogDataset {
    pub versions: Vec<ChangelogVersion>,
}

/// Release notes for one version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogVersion {
    pub version: String,

    /// ISO-8601 release date. Only the leading `YYYY-MM-DD` is interpreted.
    pub date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,

    #[serde(default)]
    pub breaking: Vec<String>,

    #[serde(default)]
    pub features: Vec<String>,

    #[serde(default)]
    pub fixes: Vec<String>,

    #[serde(default)]
    pub improvements: Vec<String>,

    #[serde(default)]
    pub highlights: Vec<String>,
}

impl ChangelogVersion {
    /// Page this version is published to.
    pub fn target_page(&self) -> &str {
        self.page_id.as_deref().unwrap_or(DEFAULT_PAGE_ID)
    }

    /// URL slug for the version's page: every `.` becomes `-`.
    pub fn slug(&self) -> String {
        self.version.replace('.', "-")
    }

    /// The year bucket used by the summary page: the text before the first `-`.
    pub fn year(&self) -> &str {
        self.date.split('-').next().unwrap_or_default()
    }

    fn release_date(&self) -> Option<NaiveDate> {
        let day = self.date.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

impl ChangelogDataset {
    /// Parses and validates a dataset from JSON text.
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let dataset: Self = serde_json::from_str(json)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Reads, parses and validates the dataset at `path`.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let json = fs::read_to_string(path).map_err(|source| DatasetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Checks that versions are unique and every date is a calendar date.
    pub fn validate(&self) -> Result<(), DatasetError> {
        let mut seen = HashSet::new();
        for version in &self.versions {
            if !seen.insert(version.version.as_str()) {
                return Err(DatasetError::DuplicateVersion(version.version.clone()));
            }
            if version.release_date().is_none() {
                return Err(DatasetError::InvalidDate {
                    version: version.version.clone(),
                    date: version.date.clone(),
                });
            }
        }
        Ok(())
    }

    /// Distinct year buckets in order of first appearance.
    pub fn years(&self) -> Vec<&str> {
        let mut years: Vec<&str> = Vec::new();
        for version in &self.versions {
            let year = version.year();
            if !years.contains(&year) {
                years.push(year);
            }
        }
        years
    }
}
