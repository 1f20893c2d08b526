//! Error taxonomy at the HTTP boundary and its `{"errors": [...]}` envelope.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

use rockparade_auth::{AssignmentError, AuthzError};
use rockparade_core::{DomainError, FormErrors};
use rockparade_infra::RepositoryError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error("{entity} \"{id}\" was not found.")]
    NotFound { entity: &'static str, id: String },

    #[error("Authentication required.")]
    Unauthenticated,

    #[error("Access denied.")]
    Forbidden,

    #[error(transparent)]
    Repository(RepositoryError),

    #[error("internal error")]
    Internal,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Repository(_) | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation(messages) => messages.clone(),
            Self::Repository(_) | Self::Internal => vec!["Internal server error.".to_string()],
            other => vec![other.to_string()],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        json_errors(status, self.messages())
    }
}

pub fn json_errors(status: StatusCode, messages: Vec<String>) -> axum::response::Response {
    (status, axum::Json(json!({ "errors": messages }))).into_response()
}

impl From<FormErrors> for ApiError {
    fn from(errors: FormErrors) -> Self {
        Self::Validation(errors.into_messages())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(errors) => errors.into(),
            DomainError::NotFound { entity, id } => Self::NotFound { entity, id },
            other @ (DomainError::InvalidId(_) | DomainError::Conflict(_)) => {
                Self::validation(other.to_string())
            }
        }
    }
}

impl From<AssignmentError> for ApiError {
    fn from(err: AssignmentError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<AuthzError> for ApiError {
    fn from(_: AuthzError) -> Self {
        Self::Forbidden
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // Lost a race against a concurrent writer after our own checks passed.
            RepositoryError::Duplicate { .. } => Self::validation(err.to_string()),
            RepositoryError::MissingReference(ref reference) => {
                Self::validation(format!("Unknown reference: {reference}."))
            }
            RepositoryError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Repository(other),
        }
    }
}
