use utoipa::OpenApi;

use crate::errors::ApiError;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "JSON Error Mapper",
        version = "0.1.0",
        description = "Demo service whose errors, unmatched routes and panics are all rendered as JSON ApiError bodies.",
    ),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::raise_status,
        crate::api::handlers::raise_unauthorized,
        crate::api::handlers::raise_failure,
        crate::api::handlers::raise_panic,
    ),
    components(
        schemas(ApiError)
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "demo", description = "Endpoints that raise each kind of exception"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_api_error() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();
        assert!(json.contains("\"ApiError\""));
        assert!(json.contains("\"subCode\""));
        assert!(json.contains("/demo/status/{code}"));
    }
}
