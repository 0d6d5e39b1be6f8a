//! Relevance gates applied to push events before a sync is started.
//!
//! Two independent gates must both pass: the pushed ref must be the primary
//! branch, and at least one commit must touch a changelog file. The receiver
//! checks the branch first and never consults the [`ChangeFilter`] for other
//! branches.

use super::events::PushEvent;

/// Ref of the branch whose pushes are synced unless configured otherwise.
pub const DEFAULT_PRIMARY_BRANCH_REF: &str = "refs/heads/main";

/// Path substrings that mark a file as a changelog (case-sensitive).
pub const CHANGELOG_MARKERS: [&str; 2] = ["CHANGELOG", "changelog"];

/// Decides whether a push event should trigger a sync.
pub trait ChangeFilter: Send + Sync {
    fn is_relevant(&self, event: &PushEvent) -> bool;
}

/// Matches pushes where any commit modified or added a path containing one of
/// the changelog markers.
#[derive(Debug, Clone)]
pub struct ChangelogDetector {
    markers: Vec<String>,
}

impl ChangelogDetector {
    pub fn new(markers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    fn path_matches(&self, path: &str) -> bool {
        self.markers.iter().any(|marker| path.contains(marker.as_str()))
    }
}

impl Default for ChangelogDetector {
    fn default() -> Self {
        Self::new(CHANGELOG_MARKERS)
    }
}

impl ChangeFilter for ChangelogDetector {
    fn is_relevant(&self, event: &PushEvent) -> bool {
        event
            .commits
            .iter()
            .flat_map(|commit| commit.touched_paths())
            .any(|path| self.path_matches(path))
    }
}

/// Returns true if `event` was pushed to exactly `primary_ref`.
pub fn is_primary_branch(event: &PushEvent, primary_ref: &str) -> bool {
    event.git_ref == primary_ref
}
