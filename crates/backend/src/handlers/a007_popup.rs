use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a007_popup::aggregate::{Popup, PopupDto};
use contracts::system::users::UserRole;
use serde::Deserialize;
use serde_json::json;

use crate::domain::a007_popup;
use crate::shared::api_error::{parse_uuid, ApiError, ApiResult};
use crate::system::auth::extractor::MaybeUser;

#[derive(Debug, Default, Deserialize)]
pub struct ActivePopupQuery {
    pub role: Option<UserRole>,
}

/// GET /api/popups
pub async fn list_all() -> ApiResult<Json<Vec<Popup>>> {
    Ok(Json(a007_popup::service::list_all().await?))
}

/// GET /api/popups/:id
pub async fn get_by_id(Path(id): Path<String>) -> ApiResult<Json<Popup>> {
    a007_popup::service::get_by_id(parse_uuid(&id)?)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Popup".into()))
}

/// POST /api/popups
pub async fn upsert(Json(dto): Json<PopupDto>) -> ApiResult<Json<serde_json::Value>> {
    let id = match dto.id.clone() {
        Some(id) => {
            a007_popup::service::update(dto).await?;
            id
        }
        None => a007_popup::service::create(dto).await?.to_string(),
    };
    Ok(Json(json!({ "id": id })))
}

/// DELETE /api/popups/:id
pub async fn delete(Path(id): Path<String>) -> ApiResult<StatusCode> {
    if a007_popup::service::delete(parse_uuid(&id)?).await? {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::NotFound("Popup".into()))
    }
}

/// GET /api/popups/active?role=
///
/// The token's role wins over the query parameter.
pub async fn active(
    MaybeUser(claims): MaybeUser,
    Query(query): Query<ActivePopupQuery>,
) -> ApiResult<Json<Vec<Popup>>> {
    let role = claims.map(|c| c.role).or(query.role);
    Ok(Json(a007_popup::service::list_active(role).await?))
}
