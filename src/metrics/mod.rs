pub mod middleware;
pub mod registry;

use anyhow::Context;
use axum::{
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, TextEncoder};

use crate::errors::Exception;

/// Prometheus exposition of the default registry.
///
/// Encoding failures are raised as unhandled exceptions so they render like
/// every other error.
pub async fn metrics_handler() -> Result<Response, Exception> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .context("failed to encode metrics")?;

    Ok(([(CONTENT_TYPE, encoder.format_type().to_string())], buffer).into_response())
}

pub use registry::{EXCEPTIONS_MAPPED_TOTAL, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};
