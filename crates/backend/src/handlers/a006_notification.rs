use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a006_notification::aggregate::{
    Notification, NotificationDto, UserNotification,
};
use serde_json::json;

use crate::domain::a006_notification;
use crate::shared::api_error::{parse_uuid, ApiError, ApiResult};
use crate::system::auth::extractor::CurrentUser;

/// GET /api/notifications
pub async fn list_all() -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(a006_notification::service::list_all().await?))
}

/// GET /api/notifications/:id
pub async fn get_by_id(Path(id): Path<String>) -> ApiResult<Json<Notification>> {
    a006_notification::service::get_by_id(parse_uuid(&id)?)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Notification".into()))
}

/// POST /api/notifications
pub async fn upsert(Json(dto): Json<NotificationDto>) -> ApiResult<Json<serde_json::Value>> {
    let id = match dto.id.clone() {
        Some(id) => {
            a006_notification::service::update(dto).await?;
            id
        }
        None => a006_notification::service::create(dto).await?.to_string(),
    };
    Ok(Json(json!({ "id": id })))
}

/// DELETE /api/notifications/:id
pub async fn delete(Path(id): Path<String>) -> ApiResult<StatusCode> {
    if a006_notification::service::delete(parse_uuid(&id)?).await? {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::NotFound("Notification".into()))
    }
}

/// GET /api/notifications/mine
pub async fn mine(CurrentUser(claims): CurrentUser) -> ApiResult<Json<Vec<UserNotification>>> {
    Ok(Json(a006_notification::service::list_for_user(&claims).await?))
}

/// POST /api/notifications/:id/read
pub async fn mark_read(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    a006_notification::service::mark_read(parse_uuid(&id)?, &claims).await?;
    Ok(StatusCode::OK)
}
