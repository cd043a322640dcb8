use axum::{extract::Json, http::StatusCode};
use chrono::Utc;
use contracts::system::auth::{
    LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, UserInfo,
};
use contracts::system::users::{CreateUserDto, User, UserRole};
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
use serde::Deserialize;

use crate::shared::api_error::{ApiError, ApiResult};
use crate::shared::config::get_config;
use crate::shared::data::db::get_connection;
use crate::system::auth::extractor::CurrentUser;
use crate::system::users::service::{self as user_service, LoginError};
use crate::system::auth::jwt;

fn user_info(user: User) -> UserInfo {
    UserInfo {
        id: user.id,
        username: user.username,
        full_name: user.full_name,
        email: user.email,
        role: user.role,
    }
}

async fn issue_tokens(user: User) -> ApiResult<LoginResponse> {
    let access_token = jwt::generate_access_token(&user.id, &user.username, user.role).await?;
    let refresh_token = jwt::generate_refresh_token();
    store_refresh_token(&user.id, &refresh_token).await?;

    Ok(LoginResponse {
        access_token,
        refresh_token,
        user: user_info(user),
    })
}

/// POST /api/system/auth/login
pub async fn login(Json(request): Json<LoginRequest>) -> ApiResult<Json<LoginResponse>> {
    let user = user_service::verify_credentials(&request.username, &request.password)
        .await
        .map_err(|e| match e {
            LoginError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid username or password".into())
            }
            LoginError::Blocked(reason) => ApiError::Forbidden(reason.to_string()),
            LoginError::Internal(err) => ApiError::from(err),
        })?;

    tracing::info!("User {} logged in", user.username);
    Ok(Json(issue_tokens(user).await?))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub full_name: Option<String>,
}

/// POST /api/system/auth/register
///
/// Self-service sign-up; always creates a customer.
pub async fn register(Json(request): Json<RegisterRequest>) -> ApiResult<Json<LoginResponse>> {
    let dto = CreateUserDto {
        username: request.username,
        password: request.password,
        email: request.email,
        phone: request.phone,
        full_name: request.full_name,
        role: UserRole::Customer,
    };
    let id = user_service::create(dto, None).await?;
    let user = user_service::get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".into()))?;
    Ok(Json(issue_tokens(user).await?))
}

/// POST /api/system/auth/refresh
pub async fn refresh(Json(request): Json<RefreshRequest>) -> ApiResult<Json<RefreshResponse>> {
    let user_id = validate_refresh_token(&request.refresh_token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired refresh token".into()))?;

    let user = user_service::get_by_id(&user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown user".into()))?;
    if let Some(reason) = user.login_block_reason() {
        return Err(ApiError::Forbidden(reason.to_string()));
    }

    let access_token = jwt::generate_access_token(&user.id, &user.username, user.role).await?;
    Ok(Json(RefreshResponse { access_token }))
}

/// POST /api/system/auth/logout
pub async fn logout(Json(request): Json<RefreshRequest>) -> ApiResult<StatusCode> {
    revoke_refresh_token(&request.refresh_token).await?;
    Ok(StatusCode::OK)
}

/// GET /api/system/auth/me
pub async fn current_user(CurrentUser(claims): CurrentUser) -> ApiResult<Json<UserInfo>> {
    let user = user_service::get_by_id(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".into()))?;
    Ok(Json(user_info(user)))
}

// Helper functions for refresh tokens

async fn store_refresh_token(user_id: &str, token: &str) -> anyhow::Result<()> {
    let now = Utc::now();
    let expires_at =
        jwt::calculate_refresh_token_expiration(now, get_config().auth.refresh_token_days);

    get_connection()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "INSERT INTO sys_refresh_tokens (id, user_id, token_hash, expires_at, created_at)
             VALUES (?, ?, ?, ?, ?)",
            [
                uuid::Uuid::new_v4().to_string().into(),
                user_id.into(),
                hash_token(token).into(),
                expires_at.into(),
                now.to_rfc3339().into(),
            ],
        ))
        .await?;

    Ok(())
}

async fn validate_refresh_token(token: &str) -> anyhow::Result<Option<String>> {
    let row = get_connection()
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT user_id FROM sys_refresh_tokens
             WHERE token_hash = ? AND expires_at > ? AND revoked_at IS NULL",
            [hash_token(token).into(), Utc::now().to_rfc3339().into()],
        ))
        .await?;

    match row {
        Some(row) => Ok(Some(row.try_get("", "user_id")?)),
        None => Ok(None),
    }
}

async fn revoke_refresh_token(token: &str) -> anyhow::Result<()> {
    get_connection()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE sys_refresh_tokens SET revoked_at = ? WHERE token_hash = ?",
            [Utc::now().to_rfc3339().into(), hash_token(token).into()],
        ))
        .await?;

    Ok(())
}

fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_hex() {
        let h = hash_token("abc");
        assert_eq!(
            h,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(hash_token("abd"), h);
    }
}
