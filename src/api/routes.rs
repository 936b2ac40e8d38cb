use axum::{middleware, routing::get, Router};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    health, raise_failure, raise_panic, raise_status, raise_unauthorized, route_not_found,
    AppState,
};
use super::middleware::{handle_panic, logging_middleware, render_exceptions};
use super::openapi::ApiDoc;
use crate::metrics;

pub fn create_router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health))
        // Demo endpoints, one per exception kind
        .route("/demo/status/:code", get(raise_status))
        .route("/demo/unauthorized", get(raise_unauthorized))
        .route("/demo/failure", get(raise_failure))
        .route("/demo/panic", get(raise_panic))
        // Metrics endpoint (Prometheus)
        .route("/metrics", get(metrics::metrics_handler))
        // OpenAPI documentation
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(route_not_found)
        // Order matters: panics are caught innermost so the exception renderer,
        // logging and metrics all see the resulting error response.
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(state.clone(), render_exceptions))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics::middleware::track_metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
