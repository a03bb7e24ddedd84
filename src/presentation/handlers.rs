// HTTP request handlers
use crate::infrastructure::http_response::{
    cors_json, cors_json_error, cors_plain_text, cors_preflight,
};
use crate::presentation::app_state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Latest reading, fetched fresh when the proxy runs against the upstream sensor
pub async fn get_reading(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.proxy.current_reading().await {
        Ok(reading) => cors_json(StatusCode::OK, &reading),
        Err(e) => {
            tracing::error!("Error fetching sensor data: {}", e);
            cors_json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// Readings pushed by the sensor hardware
pub async fn ingest_reading(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    match state.proxy.ingest(&body) {
        Ok(reading) => {
            tracing::debug!("Ingested sand level {:.2}", reading.sand_level);
            cors_json(
                StatusCode::OK,
                &json!({ "message": "Sensor data updated successfully" }),
            )
        }
        Err(e) => {
            tracing::error!("Error updating sensor data: {}", e);
            cors_plain_text(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update sensor data")
        }
    }
}

/// CORS preflight for /api
pub async fn preflight() -> impl IntoResponse {
    cors_preflight()
}

/// Current dashboard snapshot for the presentation layer
pub async fn dashboard_snapshot(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.dashboard.snapshot())
}

/// Request an immediate poll
pub async fn refresh_dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let queued = state.dashboard.refresh();
    (StatusCode::ACCEPTED, Json(json!({ "queued": queued })))
}
