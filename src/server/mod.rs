//! HTTP server for the changelog sync service.
//!
//! # Endpoints
//!
//! - `POST /webhook/github` - Accepts GitHub push deliveries and starts a sync
//!   when the primary branch touched the changelog
//! - `GET /health` - Liveness probe

use std::sync::Arc;

use tokio_util::task::TaskTracker;

use crate::sync::SyncOrchestrator;
use crate::webhooks::ChangeFilter;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::webhook_handler;

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Webhook secret for HMAC-SHA256 signature verification.
    webhook_secret: Vec<u8>,

    /// Only pushes to this ref are considered.
    primary_branch_ref: String,

    filter: Arc<dyn ChangeFilter>,
    orchestrator: Arc<SyncOrchestrator>,

    /// Tracks spawned sync runs so shutdown can wait for them.
    tracker: TaskTracker,
}

impl AppState {
    pub fn new(
        webhook_secret: impl Into<Vec<u8>>,
        primary_branch_ref: impl Into<String>,
        filter: Arc<dyn ChangeFilter>,
        orchestrator: Arc<SyncOrchestrator>,
    ) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                webhook_secret: webhook_secret.into(),
                primary_branch_ref: primary_branch_ref.into(),
                filter,
                orchestrator,
                tracker: TaskTracker::new(),
            }),
        }
    }

    pub fn webhook_secret(&self) -> &[u8] {
        &self.inner.webhook_secret
    }

    pub fn primary_branch_ref(&self) -> &str {
        &self.inner.primary_branch_ref
    }

    pub fn filter(&self) -> &dyn ChangeFilter {
        self.inner.filter.as_ref()
    }

    pub fn orchestrator(&self) -> &Arc<SyncOrchestrator> {
        &self.inner.orchestrator
    }

    /// The tracker owning every spawned sync run.
    pub fn tracker(&self) -> &TaskTracker {
        &self.inner.tracker
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook/github", post(webhook_handler))
        .route("/health", get(health_handler))
        .with_state(app_state)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::convert::Converter;
    use crate::notify::SyncOutcome;
    use crate::test_utils::{
        RecordingHost, RecordingNotifier, SpyFilter, sample_dataset, write_dataset,
    };
    use crate::webhooks::sign;

    const SECRET: &[u8] = b"test-secret";

    struct Harness {
        state: AppState,
        host: Arc<RecordingHost>,
        notifier: Arc<RecordingNotifier>,
        filter: Arc<SpyFilter>,
        _dir: tempfile::TempDir,
    }

    impl Harness {
        fn new() -> Self {
            let (dir, path) = write_dataset(&sample_dataset());
            let host = Arc::new(RecordingHost::default());
            let notifier = Arc::new(RecordingNotifier::default());
            let filter = Arc::new(SpyFilter::default());
            let orchestrator = Arc::new(SyncOrchestrator::new(
                host.clone(),
                notifier.clone(),
                Converter::gitbook(),
                path,
            ));
            let state = AppState::new(SECRET, "refs/heads/main", filter.clone(), orchestrator);
            Harness {
                state,
                host,
                notifier,
                filter,
                _dir: dir,
            }
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
            let response = build_router(self.state.clone())
                .oneshot(request)
                .await
                .unwrap();
            let status = response.status();
            let body = response.into_body().collect().await.unwrap().to_bytes();
            (status, String::from_utf8(body.to_vec()).unwrap())
        }

        /// Waits for every spawned sync run to finish.
        async fn settle(&self) {
            self.state.tracker().close();
            self.state.tracker().wait().await;
        }
    }

    fn push(git_ref: &str, modified: &[&str]) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "ref": git_ref,
            "commits": [{ "id": "abc123", "modified": modified, "added": [] }],
            "repository": { "name": "docs", "owner": { "login": "acme" } }
        }))
        .unwrap()
    }

    fn signed_request(body: Vec<u8>, secret: &[u8]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/webhook/github")
            .header("content-type", "application/json")
            .header("x-github-event", "push")
            .header("x-hub-signature-256", sign(&body, secret))
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let harness = Harness::new();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let (status, body) = harness.send(request).await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn changelog_push_to_main_starts_sync() {
        let harness = Harness::new();

        let (status, body) = harness
            .send(signed_request(push("refs/heads/main", &["CHANGELOG.md"]), SECRET))
            .await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["message"], "Changelog sync initiated");
        let timestamp = json["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());

        harness.settle().await;
        // Two versions plus the summary.
        assert_eq!(harness.host.page_ids(), vec!["v2-0-0", "changelog", "changelog"]);
        assert_eq!(harness.notifier.outcomes(), vec![SyncOutcome::Success]);
    }

    #[tokio::test]
    async fn push_to_other_branch_is_ignored_before_filtering() {
        let harness = Harness::new();

        let (status, body) = harness
            .send(signed_request(push("refs/heads/feature-x", &["CHANGELOG.md"]), SECRET))
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Ignored non-main branch");
        harness.settle().await;
        assert_eq!(harness.filter.calls(), 0);
        assert_eq!(harness.host.attempts(), 0);
    }

    #[tokio::test]
    async fn push_without_changelog_changes_is_skipped() {
        let harness = Harness::new();

        let (status, body) = harness
            .send(signed_request(push("refs/heads/main", &["src/lib.rs"]), SECRET))
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "No changelog changes detected");
        harness.settle().await;
        assert_eq!(harness.filter.calls(), 1);
        assert_eq!(harness.host.attempts(), 0);
        assert!(harness.notifier.outcomes().is_empty());
    }

    #[tokio::test]
    async fn bad_signature_is_rejected_without_side_effects() {
        let harness = Harness::new();

        let (status, body) = harness
            .send(signed_request(push("refs/heads/main", &["CHANGELOG.md"]), b"wrong-secret"))
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, "Unauthorized");
        harness.settle().await;
        assert_eq!(harness.filter.calls(), 0);
        assert_eq!(harness.host.attempts(), 0);
        assert!(harness.notifier.outcomes().is_empty());
    }

    #[tokio::test]
    async fn missing_signature_is_rejected() {
        let harness = Harness::new();
        let request = Request::builder()
            .method("POST")
            .uri("/webhook/github")
            .body(Body::from(push("refs/heads/main", &["CHANGELOG.md"])))
            .unwrap();

        let (status, _) = harness.send(request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        harness.settle().await;
        assert_eq!(harness.host.attempts(), 0);
    }

    #[tokio::test]
    async fn signed_malformed_json_is_an_internal_error() {
        let harness = Harness::new();

        let (status, body) = harness
            .send(signed_request(b"{not json".to_vec(), SECRET))
            .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json, json!({ "error": "Internal server error" }));
        assert_eq!(harness.host.attempts(), 0);
    }

    #[tokio::test]
    async fn summary_tabs_keep_first_appearance_order() {
        let harness = Harness::new();

        harness
            .send(signed_request(push("refs/heads/main", &["docs/changelog/2.0.md"]), SECRET))
            .await;
        harness.settle().await;

        let summary = harness.host.last_document("changelog").unwrap();
        let tab_2024 = summary.find("{% tab title=\"2024\" %}").unwrap();
        let tab_2023 = summary.find("{% tab title=\"2023\" %}").unwrap();
        assert!(tab_2024 < tab_2023);
    }

    #[tokio::test]
    async fn failed_sync_still_returns_initiated() {
        let (dir, _) = write_dataset(&sample_dataset());
        let host = Arc::new(RecordingHost::failing_on(1));
        let notifier = Arc::new(RecordingNotifier::default());
        let orchestrator = Arc::new(SyncOrchestrator::new(
            host.clone(),
            notifier.clone(),
            Converter::gitbook(),
            dir.path().join("changelog-extract.json"),
        ));
        let state = AppState::new(
            SECRET,
            "refs/heads/main",
            Arc::new(SpyFilter::default()),
            orchestrator,
        );

        let response = build_router(state.clone())
            .oneshot(signed_request(push("refs/heads/main", &["CHANGELOG.md"]), SECRET))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        state.tracker().close();
        state.tracker().wait().await;
        assert_eq!(host.attempts(), 1);
        assert!(!notifier.outcomes()[0].is_success());
    }
}
