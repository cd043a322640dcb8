use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::domain::a002_promo_code::aggregate::PromoError;
use serde_json::json;
use thiserror::Error;

/// Error returned by handlers; rendered as `{"error": "..."}`.
///
/// Services keep returning `anyhow::Result` and raise these through the
/// helper constructors below; `From<anyhow::Error>` recovers them, anything
/// else becomes `Internal`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ApiError>() {
            Ok(api) => api,
            Err(err) => match err.downcast::<PromoError>() {
                Ok(promo) => ApiError::BadRequest(promo.to_string()),
                Err(err) => ApiError::Internal(err),
            },
        }
    }
}

impl From<PromoError> for ApiError {
    fn from(err: PromoError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref err) = self {
            tracing::error!("Request failed: {:#}", err);
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn bad_request(msg: impl Into<String>) -> anyhow::Error {
    ApiError::BadRequest(msg.into()).into()
}

pub fn forbidden(msg: impl Into<String>) -> anyhow::Error {
    ApiError::Forbidden(msg.into()).into()
}

pub fn not_found(what: impl Into<String>) -> anyhow::Error {
    ApiError::NotFound(what.into()).into()
}

pub fn conflict(msg: impl Into<String>) -> anyhow::Error {
    ApiError::Conflict(msg.into()).into()
}

/// Parses a path id, answering 400 for malformed UUIDs
pub fn parse_uuid(id: &str) -> ApiResult<uuid::Uuid> {
    uuid::Uuid::parse_str(id).map_err(|_| ApiError::BadRequest(format!("Invalid id: {}", id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_keep_their_status() {
        let err: ApiError = bad_request("Quantity must be at least 1").into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Quantity must be at least 1");

        let err: ApiError = not_found("Order").into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Order not found");

        let err: ApiError = anyhow::Error::from(PromoError::Expired).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Promo code has expired");
    }

    #[test]
    fn test_unknown_errors_are_internal() {
        let err: ApiError = anyhow::anyhow!("disk I/O error").into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn test_context_does_not_hide_status() {
        let err = conflict("Username already exists").context("creating user");
        let api: ApiError = err.into();
        assert_eq!(api.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_parse_uuid() {
        assert!(parse_uuid("nope").is_err());
        assert!(parse_uuid(&uuid::Uuid::new_v4().to_string()).is_ok());
    }
}
