//! Operational HTTP endpoints.
//!
//! - `/healthz`     : liveness
//! - `/metrics`     : Prometheus text format
//! - `/v1/toggles`  : read or flip the runtime recording toggles
//! - `/v1/completions` : report a completed operation

use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use shardmetrics_core::{OperationRequest, ResourceUsage};

use crate::app_state::AppState;
use crate::render::CONTENT_TYPE;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.render_metrics();

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, CONTENT_TYPE)],
        body,
    )
        .into_response()
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToggleUpdate {
    #[serde(default)]
    pub metrics_enabled: Option<bool>,
    #[serde(default)]
    pub resource_tracking_enabled: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Toggles {
    pub metrics_enabled: bool,
    pub resource_tracking_enabled: bool,
}

fn current_toggles(state: &AppState) -> Toggles {
    let settings = state.recorder().settings();
    Toggles {
        metrics_enabled: settings.metrics_enabled(),
        resource_tracking_enabled: settings.resource_tracking_enabled(),
    }
}

pub async fn get_toggles(State(state): State<AppState>) -> Json<Toggles> {
    Json(current_toggles(&state))
}

pub async fn put_toggles(State(state): State<AppState>, Json(update): Json<ToggleUpdate>) -> Json<Toggles> {
    let settings = state.recorder().settings();
    if let Some(enabled) = update.metrics_enabled {
        settings.set_metrics_enabled(enabled);
    }
    if let Some(enabled) = update.resource_tracking_enabled {
        settings.set_resource_tracking_enabled(enabled);
    }
    let toggles = current_toggles(&state);
    tracing::info!(
        metrics_enabled = toggles.metrics_enabled,
        resource_tracking_enabled = toggles.resource_tracking_enabled,
        "toggles updated"
    );
    Json(toggles)
}

/// One completed operation reported by a host process.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompletionReport {
    pub request: OperationRequest,
    pub success: bool,
    pub elapsed_ms: u64,
    #[serde(default)]
    pub usage: Option<ResourceUsage>,
}

pub async fn post_completions(
    State(state): State<AppState>,
    Json(reports): Json<Vec<CompletionReport>>,
) -> StatusCode {
    let recorder = state.recorder();
    for report in &reports {
        recorder.record_completion(
            &report.request,
            report.success,
            Duration::from_millis(report.elapsed_ms),
            report.usage,
        );
    }
    tracing::trace!(reports = reports.len(), "completions recorded");
    StatusCode::ACCEPTED
}
