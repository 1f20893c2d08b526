use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Extension;
use axum::response::Response;

use rockparade_bands::{BandEditForm, BandForm};

use crate::app::errors::ApiError;
use crate::app::extract::{pagination, ApiJson, ApiPath};
use crate::app::services::AppServices;
use crate::app::{dto, response};
use crate::context::PrincipalContext;

/// GET /bands[/{limit}[/{offset}]]
pub async fn list_bands(
    Extension(services): Extension<Arc<AppServices>>,
    ApiPath(params): ApiPath<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let page = pagination(&params)?;
    let bands = services.list_bands(page).await?;
    Ok(response::data(bands.iter().map(dto::band_to_json).collect::<Vec<_>>()))
}

/// GET /band/{id}
pub async fn view_band(
    Extension(services): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<String>,
) -> Result<Response, ApiError> {
    let band = services.band(&id).await?;
    Ok(response::data(dto::band_to_json(&band)))
}

/// POST /band
pub async fn create_band(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(form): ApiJson<BandForm>,
) -> Result<Response, ApiError> {
    let band = services.create_band(principal.login(), form).await?;
    let location = format!("/band/{}", response::encode_segment(band.name().as_str()));
    response::created(&location, dto::band_to_json(&band))
}

/// PUT /band/{id}
pub async fn edit_band(
    Extension(services): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<String>,
    ApiJson(form): ApiJson<BandEditForm>,
) -> Result<Response, ApiError> {
    services.edit_band(&id, form).await?;
    Ok(response::no_content())
}
