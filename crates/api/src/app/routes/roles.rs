use std::sync::Arc;

use axum::extract::Extension;
use axum::response::Response;

use rockparade_auth::Role;

use crate::app::dto::{self, AssignRolesRequest};
use crate::app::errors::ApiError;
use crate::app::extract::ApiJson;
use crate::app::response;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

/// GET /roles
pub async fn list_roles(Extension(services): Extension<Arc<AppServices>>) -> Result<Response, ApiError> {
    let memberships = services.list_roles().await?;
    Ok(response::data(dto::roles_to_json(&memberships)))
}

/// POST /roles/assign (admin only)
pub async fn assign_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<AssignRolesRequest>,
) -> Result<Response, ApiError> {
    authz::require_role(&principal, &Role::ADMIN)?;
    services.assign_roles(body).await?;
    Ok(response::done())
}
