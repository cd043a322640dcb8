use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a001_product::aggregate::{Product, ProductDto};
use serde::Deserialize;
use serde_json::json;

use crate::domain::a001_product;
use crate::shared::api_error::{parse_uuid, ApiError, ApiResult};
use crate::system::auth::extractor::MaybeUser;

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    #[serde(default)]
    pub active_only: bool,
}

/// GET /api/products?active_only=true
///
/// Only admins can see inactive products.
pub async fn list_all(
    MaybeUser(claims): MaybeUser,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let is_admin = claims.as_ref().map_or(false, |c| c.is_admin());
    let active_only = query.active_only || !is_admin;
    Ok(Json(a001_product::service::list_all(active_only).await?))
}

/// GET /api/products/:id
pub async fn get_by_id(
    MaybeUser(claims): MaybeUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    let is_admin = claims.as_ref().map_or(false, |c| c.is_admin());
    a001_product::service::get_by_id(parse_uuid(&id)?)
        .await?
        .filter(|p| is_admin || p.is_active)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Product".into()))
}

/// POST /api/products
pub async fn upsert(Json(dto): Json<ProductDto>) -> ApiResult<Json<serde_json::Value>> {
    let id = match dto.id.clone() {
        Some(id) => {
            a001_product::service::update(dto).await?;
            id
        }
        None => a001_product::service::create(dto).await?.to_string(),
    };
    Ok(Json(json!({ "id": id })))
}

/// DELETE /api/products/:id
pub async fn delete(Path(id): Path<String>) -> ApiResult<StatusCode> {
    if a001_product::service::delete(parse_uuid(&id)?).await? {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::NotFound("Product".into()))
    }
}
