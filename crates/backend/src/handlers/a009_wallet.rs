use axum::{extract::Path, Json};
use contracts::domain::a009_wallet::aggregate::{
    WalletCreditRequest, WalletSummary, WalletTransaction,
};

use crate::domain::a009_wallet;
use crate::shared::api_error::{ApiError, ApiResult};
use crate::system::auth::extractor::CurrentUser;
use crate::system::users::service as users;

async fn ensure_user(user_id: &str) -> ApiResult<()> {
    users::get_by_id(user_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("User".into()))
}

/// GET /api/wallet/mine
pub async fn mine(CurrentUser(claims): CurrentUser) -> ApiResult<Json<WalletSummary>> {
    Ok(Json(a009_wallet::service::summary(&claims.sub).await?))
}

/// GET /api/wallet/:user_id
pub async fn get_for_user(Path(user_id): Path<String>) -> ApiResult<Json<WalletSummary>> {
    ensure_user(&user_id).await?;
    Ok(Json(a009_wallet::service::summary(&user_id).await?))
}

/// POST /api/wallet/:user_id/credit
pub async fn credit(
    CurrentUser(claims): CurrentUser,
    Path(user_id): Path<String>,
    Json(request): Json<WalletCreditRequest>,
) -> ApiResult<Json<WalletTransaction>> {
    ensure_user(&user_id).await?;
    let reason = format!("{} (by {})", request.reason.trim(), claims.username);
    let tx = a009_wallet::service::credit(&user_id, request.amount, &reason, None).await?;
    Ok(Json(tx))
}

/// POST /api/wallet/:user_id/debit
pub async fn debit(
    CurrentUser(claims): CurrentUser,
    Path(user_id): Path<String>,
    Json(request): Json<WalletCreditRequest>,
) -> ApiResult<Json<WalletTransaction>> {
    ensure_user(&user_id).await?;
    let reason = format!("{} (by {})", request.reason.trim(), claims.username);
    let tx = a009_wallet::service::debit(&user_id, request.amount, &reason, None).await?;
    Ok(Json(tx))
}
