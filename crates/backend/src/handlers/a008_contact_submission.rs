use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a008_contact_submission::aggregate::{
    ContactSubmission, ContactSubmissionDto, UpdateContactStatusRequest,
};
use serde_json::json;

use crate::domain::a008_contact_submission;
use crate::shared::api_error::{parse_uuid, ApiError, ApiResult};

/// POST /api/contact
pub async fn create(Json(dto): Json<ContactSubmissionDto>) -> ApiResult<Json<serde_json::Value>> {
    let id = a008_contact_submission::service::create(dto).await?;
    Ok(Json(json!({ "id": id.to_string() })))
}

/// GET /api/contact
pub async fn list_all() -> ApiResult<Json<Vec<ContactSubmission>>> {
    Ok(Json(a008_contact_submission::service::list_all().await?))
}

/// GET /api/contact/:id
pub async fn get_by_id(Path(id): Path<String>) -> ApiResult<Json<ContactSubmission>> {
    a008_contact_submission::service::get_by_id(parse_uuid(&id)?)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Contact submission".into()))
}

/// POST /api/contact/:id/status
pub async fn set_status(
    Path(id): Path<String>,
    Json(request): Json<UpdateContactStatusRequest>,
) -> ApiResult<StatusCode> {
    a008_contact_submission::service::set_status(parse_uuid(&id)?, request.status).await?;
    Ok(StatusCode::OK)
}

/// DELETE /api/contact/:id
pub async fn delete(Path(id): Path<String>) -> ApiResult<StatusCode> {
    if a008_contact_submission::service::delete(parse_uuid(&id)?).await? {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::NotFound("Contact submission".into()))
    }
}
