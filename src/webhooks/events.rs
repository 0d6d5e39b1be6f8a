//! Push event payload types.
//!
//! Only the fields the sync pipeline reads are modelled; everything else in
//! GitHub's push payload is ignored during deserialization.

use serde::{Deserialize, Serialize};

/// A GitHub `push` delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    /// Fully qualified ref that was pushed, e.g. `refs/heads/main`.
    #[serde(rename = "ref")]
    pub git_ref: String,

    /// Commits included in the push, oldest first.
    #[serde(default)]
    pub commits: Vec<CommitRecord>,
}

/// The file-level summary of one pushed commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    #[serde(default)]
    pub modified: Vec<String>,

    #[serde(default)]
    pub added: Vec<String>,
}

impl CommitRecord {
    /// Iterates over modified and then added paths.
    pub fn touched_paths(&self) -> impl Iterator<Item = &str> {
        self.modified
            .iter()
            .chain(self.added.iter())
            .map(String::as_str)
    }
}

impl PushEvent {
    /// Parses a push event from the raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}
