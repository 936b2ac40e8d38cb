use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use std::fmt;
use std::sync::Arc;
use tracing::{error, warn};

use super::api_error::ApiError;
use super::exception::Exception;
use crate::config::ErrorConfig;
use crate::metrics::EXCEPTIONS_MAPPED_TOTAL;

/// Hook that may mutate the error payload before it is serialized
pub type ApiErrorCustomizer = Arc<dyn Fn(&Exception, &mut ApiError) + Send + Sync>;

/// Turns a caught exception into an HTTP response.
pub trait ExceptionFilter: Send + Sync + 'static {
    /// Catch an exception and return a response
    fn catch(&self, exception: &Exception) -> Response;
}

/// Renders exceptions as JSON `ApiError` bodies.
#[derive(Clone, Default)]
pub struct JsonExceptionMapper {
    debug_mode: bool,
    customizer: Option<ApiErrorCustomizer>,
}

impl fmt::Debug for JsonExceptionMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonExceptionMapper")
            .field("debug_mode", &self.debug_mode)
            .field("customizer", &self.customizer.is_some())
            .finish()
    }
}

impl JsonExceptionMapper {
    pub fn new(debug_mode: bool) -> Self {
        Self {
            debug_mode,
            customizer: None,
        }
    }

    pub fn from_config(config: &ErrorConfig) -> Self {
        Self::new(config.debug_mode)
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Install a hook run on every error payload, executed before the response is built
    pub fn with_customizer<F>(mut self, customizer: F) -> Self
    where
        F: Fn(&Exception, &mut ApiError) + Send + Sync + 'static,
    {
        self.customizer = Some(Arc::new(customizer));
        self
    }

    /// Replace or clear the customization hook
    pub fn set_customizer(&mut self, customizer: Option<ApiErrorCustomizer>) {
        self.customizer = customizer;
    }

    /// Extract the error message; authorization challenges are joined by newlines
    pub fn extract_message(&self, exception: &Exception) -> Option<String> {
        match exception {
            Exception::NotAuthorized { challenges } => Some(challenges.join("\n")),
            _ => exception.message(),
        }
    }

    /// Extract the HTTP status, default 500: INTERNAL_SERVER_ERROR
    pub fn extract_status(&self, exception: &Exception) -> StatusCode {
        exception
            .status()
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Build the error payload, running the customizer last
    pub fn build_error(
        &self,
        exception: &Exception,
        status: StatusCode,
        message: Option<String>,
        debug_mode: bool,
    ) -> ApiError {
        let mut error = ApiError::new(status).with_message(message);
        if debug_mode {
            error.trace = Some(exception.trace());
        }
        if let Some(customizer) = &self.customizer {
            customizer(exception, &mut error);
        }
        error
    }

    /// Build a response with a JSON body
    pub fn build_response(
        &self,
        exception: &Exception,
        status: StatusCode,
        message: Option<String>,
        debug_mode: bool,
    ) -> Response {
        let error = self.build_error(exception, status, message, debug_mode);

        match serde_json::to_vec(&error) {
            Ok(body) => (status, [(CONTENT_TYPE, "application/json")], body).into_response(),
            Err(e) => {
                error!("Failed to serialize error payload: {}", e);
                status.into_response()
            }
        }
    }
}

impl ExceptionFilter for JsonExceptionMapper {
    fn catch(&self, exception: &Exception) -> Response {
        let status = self.extract_status(exception);
        let message = self.extract_message(exception);

        if status.is_server_error() {
            error!(
                kind = exception.kind(),
                status = status.as_u16(),
                error = %exception,
                "Exception mapped to error response"
            );
        } else {
            warn!(
                kind = exception.kind(),
                status = status.as_u16(),
                error = %exception,
                "Exception mapped to error response"
            );
        }

        EXCEPTIONS_MAPPED_TOTAL
            .with_label_values(&[exception.kind(), status.as_str()])
            .inc();

        self.build_response(exception, status, message, self.debug_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_extract_status_embedded() {
        let mapper = JsonExceptionMapper::default();
        let exc = Exception::not_found("missing");
        assert_eq!(mapper.extract_status(&exc), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_extract_status_defaults_to_500() {
        let mapper = JsonExceptionMapper::default();
        let exc: Exception = anyhow::anyhow!("no status here").into();
        assert_eq!(mapper.extract_status(&exc), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_extract_message_joins_challenges() {
        let mapper = JsonExceptionMapper::default();
        let exc = Exception::not_authorized(["Basic", "Bearer"]);
        assert_eq!(mapper.extract_message(&exc).as_deref(), Some("Basic\nBearer"));
    }

    #[test]
    fn test_extract_message_default() {
        let mapper = JsonExceptionMapper::default();
        let exc = Exception::bad_request("name is required");
        assert_eq!(
            mapper.extract_message(&exc).as_deref(),
            Some("name is required")
        );
        assert_eq!(
            mapper.extract_message(&Exception::status_only(StatusCode::GONE)),
            None
        );
    }

    #[tokio::test]
    async fn test_build_response_without_debug_has_no_trace() {
        let mapper = JsonExceptionMapper::default();
        let exc = Exception::not_found("missing");
        let response = mapper.build_response(
            &exc,
            StatusCode::NOT_FOUND,
            Some("missing".to_string()),
            false,
        );

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = body_json(response).await;
        assert!(body.get("trace").is_none());
        assert_eq!(body["type"], "Not Found");
        assert_eq!(body["message"], "missing");
        assert_eq!(body["code"], 404);
        assert_eq!(body["subCode"], 0);
    }

    #[tokio::test]
    async fn test_build_response_with_debug_has_trace() {
        let mapper = JsonExceptionMapper::default();
        let exc: Exception = anyhow::anyhow!("kaboom").into();
        let response =
            mapper.build_response(&exc, StatusCode::INTERNAL_SERVER_ERROR, exc.message(), true);

        let body = body_json(response).await;
        let trace = body["trace"].as_str().unwrap();
        assert!(!trace.is_empty());
        assert!(trace.contains("kaboom"));
    }

    #[tokio::test]
    async fn test_customizer_overrides_sub_code() {
        let mapper = JsonExceptionMapper::default().with_customizer(|exc, error| {
            if matches!(exc, Exception::NotAuthorized { .. }) {
                error.sub_code = 4011;
            }
        });
        let exc = Exception::not_authorized(["Bearer"]);

        let response = mapper.catch(&exc);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["subCode"], 4011);
        assert_eq!(body["message"], "Bearer");
    }

    #[test]
    fn test_customizer_runs_after_trace() {
        let mapper = JsonExceptionMapper::default().with_customizer(|_, error| {
            error.trace = None;
            error.message = Some("redacted".to_string());
        });
        let exc = Exception::bad_request("secret detail");

        let error = mapper.build_error(&exc, StatusCode::BAD_REQUEST, exc.message(), true);
        assert_eq!(error.trace, None);
        assert_eq!(error.message.as_deref(), Some("redacted"));
    }

    #[test]
    fn test_set_customizer_none_is_tolerated() {
        let mut mapper = JsonExceptionMapper::default().with_customizer(|_, error| {
            error.sub_code = 1;
        });
        mapper.set_customizer(None);

        let exc = Exception::not_found("missing");
        let error = mapper.build_error(&exc, StatusCode::NOT_FOUND, None, false);
        assert_eq!(error.sub_code, 0);
    }

    #[test]
    fn test_missing_message_is_omitted_but_code_kept() {
        let mapper = JsonExceptionMapper::default();
        let exc = Exception::status_only(StatusCode::CONFLICT);
        let response = mapper.build_response(&exc, StatusCode::CONFLICT, None, false);

        let body = tokio_test::block_on(body_json(response));
        assert!(body.get("message").is_none());
        assert_eq!(body["code"], 409);
        assert_eq!(body["type"], "Conflict");
    }

    #[tokio::test]
    async fn test_catch_uses_configured_debug_mode() {
        let mapper = JsonExceptionMapper::from_config(&ErrorConfig { debug_mode: true });
        let exc = Exception::not_found("missing");

        let body = body_json(mapper.catch(&exc)).await;
        assert_eq!(body["trace"], "Http: HTTP 404 Not Found: missing");
    }
}
