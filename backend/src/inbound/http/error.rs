//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::ReferenceNotFound => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        ErrorCode::InternalInconsistency | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn redact_if_internal(error: &Error) -> Error {
    match error.code() {
        ErrorCode::InternalError | ErrorCode::InternalInconsistency => {
            let mut redacted = Error::new(error.code(), "Internal server error");
            if let Some(id) = error.trace_id() {
                redacted = redacted.with_trace_id(id.to_owned());
            }
            redacted
        }
        _ => error.clone(),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if self.code().is_retryable() {
            builder.insert_header(("Retry-After", "1"));
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

fn malformed(source: &str, reason: String) -> actix_web::Error {
    Error::invalid_request(format!("malformed {source}: {reason}"))
        .with_details(json!({ "field": source, "code": "malformed" }))
        .into()
}

/// Report undecodable JSON bodies as `invalid_request`.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    malformed("body", err.to_string())
}

/// Report undecodable query strings as `invalid_request`.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    malformed("query", err.to_string())
}

/// Report undecodable path segments as `invalid_request`.
pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    malformed("path", err.to_string())
}
