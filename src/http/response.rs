//! Response construction helpers.
//!
//! # Responsibilities
//! - Build redirects with a `Location` header
//! - Build plain-text error responses
//!
//! # Design Decisions
//! - Error bodies are short plain text; this is a local development tool
//! - Invalid header values become a 500 via axum's `IntoResponseParts`

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
};

/// Redirect to `location` with the given 3xx status.
pub fn redirect(status: StatusCode, location: &str) -> Response {
    (status, [(header::LOCATION, location.to_string())]).into_response()
}

/// Plain-text response with the given status.
pub fn plain_text(status: StatusCode, body: impl Into<String>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body.into(),
    )
        .into_response()
}

pub fn not_found() -> Response {
    plain_text(StatusCode::NOT_FOUND, "File not found")
}

/// Static routes only answer GET and HEAD.
pub fn not_implemented(method: &Method) -> Response {
    plain_text(
        StatusCode::NOT_IMPLEMENTED,
        format!("Unsupported method ({method})"),
    )
}
