use axum::Json;
use contracts::system::email::{SendEmailRequest, SendEmailResponse};

use crate::shared::api_error::ApiResult;
use crate::system::auth::extractor::CurrentUser;
use crate::system::email::service;

/// POST /api/email/send
pub async fn send(
    CurrentUser(claims): CurrentUser,
    Json(request): Json<SendEmailRequest>,
) -> ApiResult<Json<SendEmailResponse>> {
    Ok(Json(service::send(request, &claims.username).await?))
}
