use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Structured error payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Reason phrase of the HTTP status (e.g. "Not Found")
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Human-readable error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// HTTP status code
    pub code: u16,
    /// Application-specific code, zero unless a customizer sets it
    #[serde(default)]
    pub sub_code: i32,
    /// Formatted trace, only present in debug mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl ApiError {
    /// Create an error for the given status, type set to its reason phrase
    pub fn new(status: StatusCode) -> Self {
        Self {
            error_type: status.canonical_reason().map(str::to_string),
            code: status.as_u16(),
            ..Self::default()
        }
    }

    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    pub fn with_sub_code(mut self, sub_code: i32) -> Self {
        self.sub_code = sub_code;
        self
    }

    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_new_uses_reason_phrase() {
        let err = ApiError::new(StatusCode::NOT_FOUND);
        assert_eq!(err.error_type.as_deref(), Some("Not Found"));
        assert_eq!(err.code, 404);
        assert_eq!(err.sub_code, 0);
    }

    #[test]
    fn test_non_canonical_status_has_no_type() {
        let status = StatusCode::from_u16(599).unwrap();
        let err = ApiError::new(status);
        assert_eq!(err.error_type, None);

        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value, json!({ "code": 599, "subCode": 0 }));
    }

    #[test]
    fn test_full_serialization_keys() {
        let err = ApiError::new(StatusCode::BAD_REQUEST)
            .with_message(Some("bad input".to_string()))
            .with_sub_code(12)
            .with_trace("Http: HTTP 400 Bad Request");

        let value: Value = serde_json::to_value(&err).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "Bad Request",
                "message": "bad input",
                "code": 400,
                "subCode": 12,
                "trace": "Http: HTTP 400 Bad Request"
            })
        );
    }

    #[test]
    fn test_key_order_is_stable() {
        let err = ApiError::new(StatusCode::NOT_FOUND).with_message(Some("gone".to_string()));
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(
            json,
            r#"{"type":"Not Found","message":"gone","code":404,"subCode":0}"#
        );
    }

    #[test]
    fn test_deserialize_without_sub_code() {
        let err: ApiError = serde_json::from_str(r#"{"code":500}"#).unwrap();
        assert_eq!(err.code, 500);
        assert_eq!(err.sub_code, 0);
        assert_eq!(err.message, None);
    }
}
