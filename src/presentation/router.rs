// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    dashboard_snapshot, get_reading, health_check, ingest_reading, preflight, refresh_dashboard,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route(
            "/api",
            get(get_reading).post(ingest_reading).options(preflight),
        )
        .route("/dashboard", get(dashboard_snapshot))
        .route("/dashboard/refresh", post(refresh_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
