use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::header::{CONTENT_LENGTH, CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::any::Any;

use crate::api::handlers::AppState;
use crate::errors::{Exception, RaisedException};

/// Largest framework error body kept as the exception message
const MAX_REJECTION_BODY_BYTES: usize = 16 * 1024;

/// Route every error response through the configured filter.
///
/// Responses built from an `Exception` are re-rendered from the attached
/// exception. Error responses axum produces itself (extractor rejections,
/// 405s) become `Exception::Http` with their status and body text; headers
/// such as `Allow` are kept.
pub async fn render_exceptions(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    if let Some(RaisedException(exception)) = response.extensions_mut().remove::<RaisedException>() {
        return state.exception_filter.catch(&exception);
    }

    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let message = match to_bytes(body, MAX_REJECTION_BODY_BYTES).await {
        Ok(bytes) if !bytes.is_empty() => Some(String::from_utf8_lossy(&bytes).trim().to_string()),
        _ => None,
    };

    let exception = Exception::Http { status, message };
    let mut rendered = state.exception_filter.catch(&exception);

    for (name, value) in parts.headers.iter() {
        if *name != CONTENT_TYPE && *name != CONTENT_LENGTH && !rendered.headers().contains_key(name) {
            rendered.headers_mut().insert(name.clone(), value.clone());
        }
    }

    rendered
}

/// Panic handler for `CatchPanicLayer`; the panic becomes an unhandled exception
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    Exception::from_panic(payload).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_handle_panic_attaches_exception() {
        let response = handle_panic(Box::new("worker died"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let raised = response.extensions().get::<RaisedException>().unwrap();
        assert_eq!(raised.0.kind(), "Unhandled");
        assert_eq!(
            raised.0.message().as_deref(),
            Some("handler panicked: worker died")
        );
    }
}
