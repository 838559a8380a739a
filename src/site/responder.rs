//! Whole-file static responses.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use std::borrow::Cow;
use std::path::Path;

use crate::http::response::{not_found, plain_text};

/// Content type for `path`.
///
/// Script, module, JSON and wasm types are pinned so browsers accept them
/// whatever the host's MIME database says.
pub fn content_type_for(path: &Path) -> Cow<'static, str> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("js" | "mjs" | "ts") => Cow::Borrowed("application/javascript"),
        Some("json") => Cow::Borrowed("application/json"),
        Some("wasm") => Cow::Borrowed("application/wasm"),
        _ => Cow::Owned(mime_guess::from_path(path).first_or_octet_stream().to_string()),
    }
}

/// Read `path` fully and answer 200, 404 if it vanished, or 500 on any other I/O error.
pub async fn serve(path: &Path) -> Response {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return not_found(),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to read file");
            return plain_text(StatusCode::INTERNAL_SERVER_ERROR, format!("Internal server error: {e}"));
        }
    };

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Serving file");

    let content_type = HeaderValue::from_str(&content_type_for(path))
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let length = HeaderValue::from(bytes.len());

    let mut response = Response::new(Body::from(bytes));
    response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    response.headers_mut().insert(header::CONTENT_LENGTH, length);
    response
}
