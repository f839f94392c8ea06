//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework agnostic by not deriving `ToSchema`; these
//! wrappers mirror their serialised shape for the generated document.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The resource does not exist for the caller.
    #[schema(rename = "not_found")]
    NotFound,
    /// The database or another dependency is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = Error, rename_all = "camelCase")]
pub struct ErrorSchema {
    #[schema(example = "invalid_request")]
    pub code: ErrorCodeSchema,
    #[schema(example = "title must not be empty")]
    pub message: String,
    /// Correlates the response with server logs.
    #[schema(example = "6f1c2a5e-3c1b-4f0e-9d8a-2b7e4c1d9f00")]
    pub trace_id: Option<String>,
    /// For validation failures: `{ "field": ..., "code": ... }`.
    pub details: Option<serde_json::Value>,
}
