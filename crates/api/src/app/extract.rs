//! Request extraction that reports failures in the JSON error envelope.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use rockparade_infra::Pagination;

use crate::app::errors::ApiError;

/// JSON object body. An empty body reads as `{}`.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::validation(format!("Unreadable request body: {e}.")))?;
        parse_object(&bytes).map(ApiJson)
    }
}

fn parse_object<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let value: serde_json::Value = if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        serde_json::from_slice(bytes)
            .map_err(|_| ApiError::validation("Request body must be a JSON object."))?
    };
    let serde_json::Value::Object(object) = value else {
        return Err(ApiError::validation("Request body must be a JSON object."));
    };
    match serde_json::from_value(serde_json::Value::Object(object.clone())) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            tracing::debug!(error = %e, "request body does not match the form");
            Err(ApiError::Validation(invalid_fields::<T>(&object)))
        }
    }
}

/// Name the top-level fields that fail to deserialize on their own.
fn invalid_fields<T: DeserializeOwned>(object: &serde_json::Map<String, serde_json::Value>) -> Vec<String> {
    let invalid: Vec<String> = object
        .iter()
        .filter(|(key, value)| {
            let mut single = serde_json::Map::new();
            single.insert((*key).clone(), (*value).clone());
            serde_json::from_value::<T>(serde_json::Value::Object(single)).is_err()
        })
        .map(|(key, _)| format!("Field \"{key}\" is invalid."))
        .collect();
    if invalid.is_empty() {
        vec!["Request body is malformed.".to_string()]
    } else {
        invalid
    }
}

/// Path parameters whose rejections use the JSON error envelope.
#[derive(Debug, Clone)]
pub struct ApiPath<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ApiPath(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "path rejected");
                Err(ApiError::validation("Invalid path parameter."))
            }
        }
    }
}

/// Read `limit` / `offset` path segments; absent segments use the defaults.
pub fn pagination(params: &HashMap<String, String>) -> Result<Pagination, ApiError> {
    let number = |name: &str| -> Result<Option<u32>, ApiError> {
        params
            .get(name)
            .map(|raw| {
                raw.parse::<u32>().map_err(|_| {
                    ApiError::validation(format!("Parameter \"{name}\" must be a non-negative integer."))
                })
            })
            .transpose()
    };
    Ok(Pagination::new(number("limit")?, number("offset")?))
}
