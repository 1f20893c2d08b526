use std::sync::Arc;

use axum::extract::Extension;
use axum::response::Response;

use rockparade_bands::BandMemberForm;

use crate::app::errors::ApiError;
use crate::app::extract::{ApiJson, ApiPath};
use crate::app::services::AppServices;
use crate::app::{dto, response};

/// GET /band/{id}/members
pub async fn list_members(
    Extension(services): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<String>,
) -> Result<Response, ApiError> {
    let members = services.list_members(&id).await?;
    Ok(response::data(members.iter().map(dto::member_to_json).collect::<Vec<_>>()))
}

/// POST /band/{id}/members
pub async fn add_member(
    Extension(services): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<String>,
    ApiJson(form): ApiJson<BandMemberForm>,
) -> Result<Response, ApiError> {
    services.add_member(&id, form).await?;
    Ok(response::done())
}

/// DELETE /band/{id}/member/{login}
pub async fn remove_member(
    Extension(services): Extension<Arc<AppServices>>,
    ApiPath((id, login)): ApiPath<(String, String)>,
) -> Result<Response, ApiError> {
    services.remove_member(&id, &login).await?;
    Ok(response::no_content())
}

/// PUT /band/{id}/member
pub async fn update_member(
    Extension(services): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<String>,
    ApiJson(form): ApiJson<BandMemberForm>,
) -> Result<Response, ApiError> {
    services.update_member(&id, form).await?;
    Ok(response::no_content())
}
