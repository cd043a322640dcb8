use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a002_promo_code::aggregate::{
    PromoCode, PromoCodeDto, ValidatePromoRequest, ValidatePromoResponse,
};
use serde_json::json;

use crate::domain::a002_promo_code;
use crate::shared::api_error::{parse_uuid, ApiError, ApiResult};
use crate::system::auth::extractor::CurrentUser;

/// GET /api/promo-codes
pub async fn list_all() -> ApiResult<Json<Vec<PromoCode>>> {
    Ok(Json(a002_promo_code::service::list_all().await?))
}

/// GET /api/promo-codes/:id
pub async fn get_by_id(Path(id): Path<String>) -> ApiResult<Json<PromoCode>> {
    a002_promo_code::service::get_by_id(parse_uuid(&id)?)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Promo code".into()))
}

/// POST /api/promo-codes
pub async fn upsert(Json(dto): Json<PromoCodeDto>) -> ApiResult<Json<serde_json::Value>> {
    let id = match dto.id.clone() {
        Some(id) => {
            a002_promo_code::service::update(dto).await?;
            id
        }
        None => a002_promo_code::service::create(dto).await?.to_string(),
    };
    Ok(Json(json!({ "id": id })))
}

/// DELETE /api/promo-codes/:id
pub async fn delete(Path(id): Path<String>) -> ApiResult<StatusCode> {
    if a002_promo_code::service::delete(parse_uuid(&id)?).await? {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::NotFound("Promo code".into()))
    }
}

/// POST /api/promo-codes/validate
///
/// Customers are always checked against their own usage; `user_id` is honoured for admins.
pub async fn validate(
    CurrentUser(claims): CurrentUser,
    Json(request): Json<ValidatePromoRequest>,
) -> ApiResult<Json<ValidatePromoResponse>> {
    let customer = if claims.is_admin() {
        None
    } else {
        Some(claims.sub.as_str())
    };
    Ok(Json(a002_promo_code::service::validate(request, customer).await?))
}
