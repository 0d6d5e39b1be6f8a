//! Shared test doubles and fixtures.

use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::changelog::{ChangelogDataset, ChangelogVersion};
use crate::gitbook::{DocumentHost, GitBookApiError};
use crate::notify::{Notifier, SyncOutcome};
use crate::webhooks::{ChangeFilter, ChangelogDetector, PushEvent};

/// Records every successful page update. Optionally fails the n-th call
/// (1-based) with HTTP 500.
#[derive(Default)]
pub struct RecordingHost {
    calls: Mutex<Vec<(String, String)>>,
    attempts: AtomicUsize,
    fail_on: Option<usize>,
}

impl RecordingHost {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Default::default()
        }
    }

    /// `(page_id, document)` pairs in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn page_ids(&self) -> Vec<String> {
        self.calls().into_iter().map(|(page, _)| page).collect()
    }

    /// Every update attempt, including a failed one.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn last_document(&self, page_id: &str) -> Option<String> {
        self.calls()
            .into_iter()
            .rev()
            .find(|(page, _)| page == page_id)
            .map(|(_, document)| document)
    }
}

#[async_trait]
impl DocumentHost for RecordingHost {
    async fn update_page(&self, page_id: &str, document: &str) -> Result<(), GitBookApiError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(attempt) {
            return Err(GitBookApiError::from_status(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
        self.calls
            .lock()
            .unwrap()
            .push((page_id.to_string(), document.to_string()));
        Ok(())
    }
}

/// Holds every update until [`GatedHost::release`] is called, then forwards to
/// the wrapped host.
pub struct GatedHost {
    inner: Arc<RecordingHost>,
    released: AtomicBool,
    blocked: Notify,
    gate: Notify,
}

impl GatedHost {
    pub fn new(inner: Arc<RecordingHost>) -> Self {
        Self {
            inner,
            released: AtomicBool::new(false),
            blocked: Notify::new(),
            gate: Notify::new(),
        }
    }

    /// Waits until an update is parked at the gate.
    pub async fn wait_until_blocked(&self) {
        self.blocked.notified().await;
    }

    pub fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
        self.gate.notify_one();
    }
}

#[async_trait]
impl DocumentHost for GatedHost {
    async fn update_page(&self, page_id: &str, document: &str) -> Result<(), GitBookApiError> {
        if !self.released.load(Ordering::SeqCst) {
            self.blocked.notify_one();
            self.gate.notified().await;
        }
        self.inner.update_page(page_id, document).await
    }
}

/// Records every notified outcome.
#[derive(Default)]
pub struct RecordingNotifier {
    outcomes: Mutex<Vec<SyncOutcome>>,
}

impl RecordingNotifier {
    pub fn outcomes(&self) -> Vec<SyncOutcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, outcome: &SyncOutcome) {
        self.outcomes.lock().unwrap().push(outcome.clone());
    }
}

/// Counts invocations of the wrapped changelog detector.
#[derive(Default)]
pub struct SpyFilter {
    inner: ChangelogDetector,
    calls: AtomicUsize,
}

impl SpyFilter {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ChangeFilter for SpyFilter {
    fn is_relevant(&self, event: &PushEvent) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.is_relevant(event)
    }
}

/// Two versions, newest first: 2.0.0 (2024, own page) and 1.5.0 (2023, default page).
pub fn sample_dataset() -> ChangelogDataset {
    ChangelogDataset {
        versions: vec![
            ChangelogVersion {
                version: "2.0.0".into(),
                date: "2024-01-01".into(),
                page_id: Some("v2-0-0".into()),
                breaking: vec!["Removed the v1 API".into()],
                features: vec!["Plugins".into()],
                highlights: vec!["Plugin system".into()],
                ..Default::default()
            },
            ChangelogVersion {
                version: "1.5.0".into(),
                date: "2023-06-01".into(),
                fixes: vec!["Fixed login redirect".into()],
                ..Default::default()
            },
        ],
    }
}

/// Writes `dataset` as JSON into a fresh temp dir. Keep the dir alive for the test.
pub fn write_dataset(dataset: &ChangelogDataset) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("changelog-extract.json");
    std::fs::write(&path, serde_json::to_string_pretty(dataset).unwrap()).unwrap();
    (dir, path)
}
