//! Exception model and its rendering as JSON error responses

pub mod api_error;
pub mod exception;
pub mod mapper;

pub use api_error::ApiError;
pub use exception::Exception;
pub use mapper::{ApiErrorCustomizer, ExceptionFilter, JsonExceptionMapper};

use axum::response::{IntoResponse, Response};
use std::sync::Arc;

/// Exception attached to a response so the rendering middleware can re-render it
#[derive(Debug, Clone)]
pub struct RaisedException(pub Arc<Exception>);

/// Renders with a default mapper (no trace, no customizer). When the
/// `render_exceptions` middleware is installed it replaces this body with the
/// configured filter's output.
impl IntoResponse for Exception {
    fn into_response(self) -> Response {
        let mapper = JsonExceptionMapper::default();
        let status = mapper.extract_status(&self);
        let message = mapper.extract_message(&self);
        let mut response = mapper.build_response(&self, status, message, false);
        response
            .extensions_mut()
            .insert(RaisedException(Arc::new(self)));
        response
    }
}
