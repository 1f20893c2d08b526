use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::app::errors::json_errors;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(json!({
        "data": {
            "login": principal.login().as_str(),
            "roles": principal.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        }
    }))
}

pub async fn not_found() -> axum::response::Response {
    json_errors(StatusCode::NOT_FOUND, vec!["Route not found.".to_string()])
}

pub async fn method_not_allowed() -> axum::response::Response {
    json_errors(StatusCode::METHOD_NOT_ALLOWED, vec!["Method not allowed.".to_string()])
}
