// HTTP response utilities for the JSON proxy surface
use axum::{
    body::Body,
    http::{header, HeaderValue, Response, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;

pub const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";

fn any_origin() -> HeaderValue {
    HeaderValue::from_static("*")
}

/// Serialize `data` as JSON with `Access-Control-Allow-Origin: *`.
pub fn cors_json<T: Serialize>(status: StatusCode, data: &T) -> Response<Body> {
    let body = match serde_json::to_vec(data) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("JSON serialization error: {}", e);
            return cors_json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    build(
        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, any_origin())
            .body(Body::from(body)),
    )
}

/// `{"error": message}` envelope used by the read side.
pub fn cors_json_error(status: StatusCode, message: &str) -> Response<Body> {
    let body = serde_json::json!({ "error": message }).to_string();

    build(
        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, any_origin())
            .body(Body::from(body)),
    )
}

/// Bare text body used by the ingest side; no JSON envelope.
pub fn cors_plain_text(status: StatusCode, message: &'static str) -> Response<Body> {
    build(
        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, any_origin())
            .body(Body::from(message)),
    )
}

/// Empty 204 answering a CORS preflight.
pub fn cors_preflight() -> Response<Body> {
    build(
        Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, any_origin())
            .header(header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS)
            .header(header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS)
            .body(Body::empty()),
    )
}

fn build(response: Result<Response<Body>, axum::http::Error>) -> Response<Body> {
    response.unwrap_or_else(|e| {
        tracing::error!("Response build error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}
