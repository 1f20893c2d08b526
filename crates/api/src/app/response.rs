//! Success side of the envelope: `{"data": ...}` or an empty body.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

use crate::app::errors::ApiError;

/// 200 with `{"data": value}`.
pub fn data<T: Serialize>(value: T) -> Response {
    (StatusCode::OK, axum::Json(json!({ "data": value }))).into_response()
}

/// 201 with a `Location` header and `{"data": value}`.
pub fn created<T: Serialize>(location: &str, value: T) -> Result<Response, ApiError> {
    let location = HeaderValue::from_str(location).map_err(|_| ApiError::Internal)?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        axum::Json(json!({ "data": value })),
    )
        .into_response())
}

/// 200 with an empty body ("action done").
pub fn done() -> Response {
    StatusCode::OK.into_response()
}

/// 204.
pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Percent-encode a path segment so that it can travel in a `Location` header.
pub fn encode_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
