use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use tierflow_core::event::ArrivalNotification;
use tierflow_core::extractor::ExtractError;
use tierflow_core::journal::JournalFilter;

use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NotificationAccepted {
    run_id: String,
}

fn error_body(message: impl Into<String>) -> Json<serde_json::Value> {
    Json(json!({ "error": message.into() }))
}

/// GET /api/v1/health
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": VERSION,
    }))
}

/// GET /api/v1/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let total = state.service().list_runs().await.len();
    let active = state.service().active_count().await;
    Json(json!({
        "version": VERSION,
        "active_runs": active,
        "total_runs": total,
    }))
}

/// GET /api/v1/config
///
/// Secrets are stripped before serialization.
pub async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.sanitized_config())
}

/// POST /api/v1/notifications
///
/// Accepts an arrival notification and opens a run. The run executes on
/// its own task; the response carries the run id to poll.
pub async fn submit_notification(
    State(state): State<Arc<AppState>>,
    Json(notification): Json<ArrivalNotification>,
) -> impl IntoResponse {
    match state.service().notify(notification).await {
        Ok(run_id) => (
            StatusCode::ACCEPTED,
            Json(json!(NotificationAccepted { run_id })),
        ),
        Err(e) => {
            let status = match &e {
                ExtractError::InvalidKey { .. } => StatusCode::BAD_REQUEST,
                ExtractError::UnknownTier { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                ExtractError::ObjectUnavailable { .. } => StatusCode::NOT_FOUND,
            };
            (status, error_body(e.to_string()))
        }
    }
}

/// GET /api/v1/runs
pub async fn list_runs(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.service().list_runs().await)
}

/// GET /api/v1/runs/{id}
pub async fn get_run(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.service().status(&id).await {
        Some(summary) => (StatusCode::OK, Json(json!(summary))),
        None => (
            StatusCode::NOT_FOUND,
            error_body(format!("run {} not found", id)),
        ),
    }
}

/// DELETE /api/v1/runs/{id}
pub async fn cancel_run(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if state.service().cancel(&id).await {
        return (StatusCode::OK, Json(json!({ "cancelled": true })));
    }
    match state.service().status(&id).await {
        Some(_) => (
            StatusCode::CONFLICT,
            error_body(format!("run {} already finished", id)),
        ),
        None => (
            StatusCode::NOT_FOUND,
            error_body(format!("run {} not found", id)),
        ),
    }
}

#[derive(Debug, Deserialize)]
pub struct JournalQuery {
    pub run_id: Option<String>,
    pub event_type: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/journal
pub async fn query_journal(
    State(state): State<Arc<AppState>>,
    Query(params): Query<JournalQuery>,
) -> impl IntoResponse {
    let mut filter = JournalFilter::new();
    if let Some(run_id) = params.run_id {
        filter = filter.with_run_id(run_id);
    }
    if let Some(event_type) = params.event_type {
        filter = filter.with_event_type(event_type);
    }
    filter = filter.with_time_range(params.from, params.to);
    if let Some(limit) = params.limit {
        filter = filter.with_limit(limit);
    }
    if let Some(offset) = params.offset {
        filter = filter.with_offset(offset);
    }

    match state.journal().query(&filter) {
        Ok(records) => (StatusCode::OK, Json(json!(records))),
        Err(e) => {
            tracing::error!("journal query failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("journal query failed"),
            )
        }
    }
}

/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    crate::metrics::render()
}
