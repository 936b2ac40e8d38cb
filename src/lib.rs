//! Renders exceptions raised inside an axum service as structured JSON error
//! responses.
//!
//! Handlers return [`Exception`] (directly or through `?`). The
//! [`render_exceptions`](api::middleware::render_exceptions) middleware hands
//! every raised exception to an [`ExceptionFilter`], by default a
//! [`JsonExceptionMapper`], which produces a body such as
//!
//! ```json
//! { "type": "Not Found", "message": "Widget 42 not found", "code": 404, "subCode": 0 }
//! ```

pub mod api;
pub mod config;
pub mod errors;
pub mod metrics;

pub use errors::{ApiError, ApiErrorCustomizer, Exception, ExceptionFilter, JsonExceptionMapper};
