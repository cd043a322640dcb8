use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a004_deliverable_pincode::aggregate::{
    DeliverablePincode, DeliverablePincodeDto, PincodeCheckResponse,
};
use serde_json::json;

use crate::domain::a004_deliverable_pincode;
use crate::shared::api_error::{parse_uuid, ApiError, ApiResult};

/// GET /api/deliverable-pincodes
pub async fn list_all() -> ApiResult<Json<Vec<DeliverablePincode>>> {
    Ok(Json(a004_deliverable_pincode::service::list_all().await?))
}

/// GET /api/deliverable-pincodes/:id
pub async fn get_by_id(Path(id): Path<String>) -> ApiResult<Json<DeliverablePincode>> {
    a004_deliverable_pincode::service::get_by_id(parse_uuid(&id)?)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Pincode".into()))
}

/// POST /api/deliverable-pincodes
pub async fn upsert(Json(dto): Json<DeliverablePincodeDto>) -> ApiResult<Json<serde_json::Value>> {
    let id = match dto.id.clone() {
        Some(id) => {
            a004_deliverable_pincode::service::update(dto).await?;
            id
        }
        None => a004_deliverable_pincode::service::create(dto).await?.to_string(),
    };
    Ok(Json(json!({ "id": id })))
}

/// DELETE /api/deliverable-pincodes/:id
pub async fn delete(Path(id): Path<String>) -> ApiResult<StatusCode> {
    if a004_deliverable_pincode::service::delete(parse_uuid(&id)?).await? {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::NotFound("Pincode".into()))
    }
}

/// GET /api/deliverable-pincodes/check/:pincode
pub async fn check(Path(pincode): Path<String>) -> ApiResult<Json<PincodeCheckResponse>> {
    Ok(Json(a004_deliverable_pincode::service::check(&pincode).await?))
}
