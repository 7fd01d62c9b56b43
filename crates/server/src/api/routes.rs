use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::{handlers, middleware};
use crate::state::AppState;

/// Builds the application router.
///
/// All JSON endpoints live under `/api/v1`; the Prometheus exposition
/// endpoint sits at the root so scrapers do not need the API prefix.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::get_status))
        .route("/config", get(handlers::get_config))
        .route("/notifications", post(handlers::submit_notification))
        .route("/runs", get(handlers::list_runs))
        .route("/runs/{id}", get(handlers::get_run))
        .route("/runs/{id}", delete(handlers::cancel_run))
        .route("/journal", get(handlers::query_journal))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api)
        .route("/metrics", get(handlers::metrics))
        .layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(TraceLayer::new_for_http())
}
