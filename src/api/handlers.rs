use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use utoipa::IntoParams;

use crate::errors::{Exception, ExceptionFilter};

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub exception_filter: Arc<dyn ExceptionFilter>,
    pub instance_id: String,
}

/// Query parameters for the status demo route
#[derive(Debug, Deserialize, IntoParams)]
pub struct RaiseParams {
    /// Message carried by the raised exception (omitted from the body when absent)
    pub message: Option<String>,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = serde_json::Value)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "json-error-mapper",
        "version": env!("CARGO_PKG_VERSION"),
        "instance_id": state.instance_id,
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}

/// Raise an exception carrying the given HTTP status
#[utoipa::path(
    get,
    path = "/demo/status/{code}",
    tag = "demo",
    params(
        ("code" = u16, Path, description = "HTTP status code to raise (400-999)"),
        RaiseParams
    ),
    responses(
        (status = 400, description = "Requested code is not an error status", body = crate::errors::ApiError),
        (status = "default", description = "Error with the requested status", body = crate::errors::ApiError)
    )
)]
pub async fn raise_status(Path(code): Path<u16>, Query(params): Query<RaiseParams>) -> Exception {
    match StatusCode::from_u16(code) {
        Ok(status) if status.is_client_error() || status.is_server_error() || code >= 600 => {
            info!("Raising HTTP {} on request", code);
            Exception::Http {
                status,
                message: params.message,
            }
        }
        _ => Exception::bad_request(format!("Not an error status code: {}", code)),
    }
}

/// Raise an authorization challenge
#[utoipa::path(
    get,
    path = "/demo/unauthorized",
    tag = "demo",
    responses(
        (status = 401, description = "Challenges joined by newlines in `message`", body = crate::errors::ApiError)
    )
)]
pub async fn raise_unauthorized() -> Exception {
    Exception::not_authorized([r#"Basic realm="json-error-mapper""#, "Bearer"])
}

/// Fail with an error that carries no HTTP status
#[utoipa::path(
    get,
    path = "/demo/failure",
    tag = "demo",
    responses(
        (status = 500, description = "Unhandled error", body = crate::errors::ApiError)
    )
)]
pub async fn raise_failure() -> Result<Json<serde_json::Value>, Exception> {
    let port = parse_upstream_port("eighty").context("failed to resolve upstream address")?;
    Ok(Json(serde_json::json!({ "port": port })))
}

fn parse_upstream_port(raw: &str) -> anyhow::Result<u16> {
    raw.parse::<u16>()
        .with_context(|| format!("invalid upstream port '{}'", raw))
}

/// Panic inside the handler
#[utoipa::path(
    get,
    path = "/demo/panic",
    tag = "demo",
    responses(
        (status = 500, description = "Panic rendered as an unhandled error", body = crate::errors::ApiError)
    )
)]
pub async fn raise_panic() -> Json<serde_json::Value> {
    panic!("demo panic requested")
}

/// Fallback for unmatched routes
pub async fn route_not_found(uri: Uri) -> Exception {
    Exception::not_found(format!("No route for {}", uri.path()))
}
