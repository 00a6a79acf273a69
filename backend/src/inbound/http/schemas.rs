//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay free of utoipa derives; these wrappers describe them for
//! the generated document.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// A referenced department, manager or parent does not exist.
    #[schema(rename = "reference_not_found")]
    ReferenceNotFound,
    /// Uniqueness violation, cycle, or delete blocked by references.
    #[schema(rename = "conflict")]
    Conflict,
    /// The targeted record does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// Stored hierarchy violates an invariant.
    #[schema(rename = "internal_inconsistency")]
    InternalInconsistency,
    /// The record store is unreachable; retry with backoff.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// The request ran past its deadline.
    #[schema(rename = "deadline_exceeded")]
    DeadlineExceeded,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "tax id 52998224725 already registered")]
    message: String,
    /// Correlation identifier, also sent in the `trace-id` header.
    #[schema(example = "6f1c1e2a-7a53-4c58-9d2e-1f7e5d0c9b11")]
    trace_id: Option<String>,
    /// Field-level context such as `{"field": "taxId", "code": "checksum_mismatch"}`.
    details: Option<serde_json::Value>,
}
