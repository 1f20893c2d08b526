use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Extension;
use axum::response::Response;

use crate::app::errors::ApiError;
use crate::app::extract::{pagination, ApiPath};
use crate::app::services::AppServices;
use crate::app::{dto, response};

/// GET /users[/{limit}[/{offset}]]
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    ApiPath(params): ApiPath<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let page = pagination(&params)?;
    let users = services.list_users(page).await?;
    Ok(response::data(users.iter().map(dto::user_to_json).collect::<Vec<_>>()))
}

/// GET /user/{login}
pub async fn view_user(
    Extension(services): Extension<Arc<AppServices>>,
    ApiPath(login): ApiPath<String>,
) -> Result<Response, ApiError> {
    let (user, roles) = services.user_with_roles(&login).await?;
    Ok(response::data(dto::user_with_roles_to_json(&user, &roles)))
}
