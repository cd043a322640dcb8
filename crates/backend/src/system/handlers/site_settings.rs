use axum::Json;
use contracts::system::site_settings::SiteSettings;

use crate::shared::api_error::ApiResult;
use crate::system::site_settings::service;

/// GET /api/site-settings
pub async fn get() -> ApiResult<Json<SiteSettings>> {
    Ok(Json(service::get().await?))
}

/// PUT /api/site-settings
pub async fn update(Json(settings): Json<SiteSettings>) -> ApiResult<Json<SiteSettings>> {
    Ok(Json(service::update(settings).await?))
}
