//! Webhook endpoint handler.
//!
//! Verifies the delivery signature, gates on branch and changelog relevance,
//! and spawns a sync run for accepted pushes. The run happens in the
//! background; its result is only ever reported through the notifier.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::AppState;
use crate::webhooks::{PushEvent, SIGNATURE_HEADER, is_primary_branch, verify_signature};

/// Errors that can occur when processing a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing or mismatched signature.
    #[error("invalid signature")]
    InvalidSignature,

    /// Authentic body that is not a push payload.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        match self {
            WebhookError::InvalidSignature => {
                (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
            }
            WebhookError::InvalidJson(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response(),
        }
    }
}

/// Body returned when a sync run was started.
#[derive(Debug, Serialize)]
pub struct SyncInitiated {
    pub message: &'static str,
    pub timestamp: String,
}

/// Webhook handler.
///
/// # Response
///
/// - 200 `{"message": "Changelog sync initiated", "timestamp": ...}`: sync spawned
/// - 200 `Ignored non-main branch`: push to another ref
/// - 200 `No changelog changes detected`: no commit touched a changelog path
/// - 401 `Unauthorized`: missing or invalid signature
/// - 500 `{"error": "Internal server error"}`: body is not valid push JSON
pub async fn webhook_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookError> {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    // Nothing is parsed before the signature checks out.
    if !verify_signature(&body, signature, app_state.webhook_secret()) {
        warn!(
            has_signature = signature.is_some(),
            "Rejected webhook with invalid signature"
        );
        return Err(WebhookError::InvalidSignature);
    }

    let event = PushEvent::from_slice(&body).inspect_err(|e| {
        error!(error = %e, "Failed to parse push payload");
    })?;

    debug!(
        git_ref = %event.git_ref,
        commits = event.commits.len(),
        "Received push"
    );

    if !is_primary_branch(&event, app_state.primary_branch_ref()) {
        debug!(git_ref = %event.git_ref, "Ignoring push to non-primary branch");
        return Ok((StatusCode::OK, "Ignored non-main branch").into_response());
    }

    if !app_state.filter().is_relevant(&event) {
        debug!(git_ref = %event.git_ref, "Push did not touch the changelog");
        return Ok((StatusCode::OK, "No changelog changes detected").into_response());
    }

    let orchestrator = app_state.orchestrator().clone();
    app_state.tracker().spawn(async move {
        orchestrator.run().await;
    });
    info!(git_ref = %event.git_ref, "Changelog sync initiated");

    Ok((
        StatusCode::OK,
        Json(SyncInitiated {
            message: "Changelog sync initiated",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }),
    )
        .into_response())
}
