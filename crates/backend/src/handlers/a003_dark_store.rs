use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a003_dark_store::aggregate::{
    DarkStore, DarkStoreDto, LowStockAlert, StockEntry,
};
use serde_json::json;

use crate::domain::a003_dark_store;
use crate::shared::api_error::{parse_uuid, ApiError, ApiResult};
use crate::system::auth::extractor::CurrentUser;

/// GET /api/dark-stores
pub async fn list_all() -> ApiResult<Json<Vec<DarkStore>>> {
    Ok(Json(a003_dark_store::service::list_all().await?))
}

/// GET /api/dark-stores/:id
pub async fn get_by_id(Path(id): Path<String>) -> ApiResult<Json<DarkStore>> {
    a003_dark_store::service::get_by_id(parse_uuid(&id)?)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Dark store".into()))
}

/// POST /api/dark-stores
pub async fn upsert(Json(dto): Json<DarkStoreDto>) -> ApiResult<Json<serde_json::Value>> {
    let id = match dto.id.clone() {
        Some(id) => {
            a003_dark_store::service::update(dto).await?;
            id
        }
        None => a003_dark_store::service::create(dto).await?.to_string(),
    };
    Ok(Json(json!({ "id": id })))
}

/// DELETE /api/dark-stores/:id
pub async fn delete(Path(id): Path<String>) -> ApiResult<StatusCode> {
    if a003_dark_store::service::delete(parse_uuid(&id)?).await? {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::NotFound("Dark store".into()))
    }
}

/// PUT /api/dark-stores/:id/stock
pub async fn set_stock(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(entry): Json<StockEntry>,
) -> ApiResult<Json<DarkStore>> {
    let id = parse_uuid(&id)?;
    if !claims.is_admin() {
        let own = a003_dark_store::service::get_for_owner(&claims.sub).await?;
        if own.base.id.value() != id {
            return Err(ApiError::Forbidden("Not your store".into()));
        }
    }
    Ok(Json(a003_dark_store::service::set_stock(id, entry).await?))
}

/// GET /api/dark-stores/mine
pub async fn mine(CurrentUser(claims): CurrentUser) -> ApiResult<Json<DarkStore>> {
    Ok(Json(a003_dark_store::service::get_for_owner(&claims.sub).await?))
}

/// GET /api/dark-stores/low-stock
pub async fn low_stock() -> ApiResult<Json<Vec<LowStockAlert>>> {
    Ok(Json(a003_dark_store::service::list_low_stock().await?))
}
