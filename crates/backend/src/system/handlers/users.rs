use axum::{
    extract::{Json, Path, Query},
    http::StatusCode,
};
use contracts::system::users::{
    ChangePasswordDto, CreateUserDto, UpdateUserDto, User, UserListQuery,
};

use crate::shared::api_error::{ApiError, ApiResult};
use crate::system::auth::extractor::CurrentUser;
use crate::system::users::service;

/// GET /api/system/users?role=
pub async fn list(
    CurrentUser(_claims): CurrentUser,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(service::list_all(query.role).await?))
}

/// GET /api/system/users/:id
pub async fn get_by_id(
    CurrentUser(_claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let user = service::get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".into()))?;
    Ok(Json(user))
}

/// POST /api/system/users
pub async fn create(
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<CreateUserDto>,
) -> ApiResult<Json<serde_json::Value>> {
    let user_id = service::create(dto, Some(&claims)).await?;
    Ok(Json(serde_json::json!({"id": user_id})))
}

/// PUT /api/system/users/:id
pub async fn update(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(mut dto): Json<UpdateUserDto>,
) -> ApiResult<StatusCode> {
    dto.id = id;
    service::update(dto, &claims).await?;
    Ok(StatusCode::OK)
}

/// DELETE /api/system/users/:id
pub async fn delete(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if service::delete(&id, &claims).await? {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::NotFound("User".into()))
    }
}

/// POST /api/system/users/:id/suspend
pub async fn suspend(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    service::set_suspended(&id, true, &claims).await?;
    Ok(StatusCode::OK)
}

/// POST /api/system/users/:id/unsuspend
pub async fn unsuspend(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    service::set_suspended(&id, false, &claims).await?;
    Ok(StatusCode::OK)
}

/// POST /api/system/users/:id/unlock
pub async fn unlock(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    service::unlock(&id, &claims).await?;
    Ok(StatusCode::OK)
}

/// POST /api/system/users/:id/change-password
pub async fn change_password(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(mut dto): Json<ChangePasswordDto>,
) -> ApiResult<StatusCode> {
    dto.user_id = id;
    service::change_password(dto, &claims).await?;
    Ok(StatusCode::OK)
}
