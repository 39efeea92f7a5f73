use axum::{
    middleware as axum_mw,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::handlers;
use crate::metrics::stream;
use crate::middleware::timing;
use crate::AppState;

/// Builds the full Axum `Router` with all routes, middleware, and static serving.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ── Alert endpoints ─────────────────────────────────────
        .route(
            "/api/alerts",
            get(handlers::alerts::list_alerts).post(handlers::alerts::create_alert),
        )
        .route("/api/alerts/:id", get(handlers::alerts::get_alert))
        // ── Network event endpoints ─────────────────────────────
        .route("/api/events", get(handlers::events::list_events))
        .route("/api/events/:id", get(handlers::events::get_event))
        // ── User endpoints ──────────────────────────────────────
        .route("/api/users/:id", get(handlers::users::get_user))
        .route("/api/users", post(handlers::users::create_user))
        // ── Metrics ─────────────────────────────────────────────
        .route("/api/metrics", get(stream::get_metrics))
        .route("/api/metrics/stream", get(stream::metrics_stream))
        // ── Serve static/ directory for the dashboard ───────────
        .fallback_service(ServeDir::new("static"))
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            timing::timing_middleware,
        ))
        .layer(CorsLayer::permissive())
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
}
