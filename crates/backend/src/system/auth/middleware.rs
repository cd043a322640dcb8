use axum::{body::Body, extract::Request, http::StatusCode, middleware::Next, response::Response};
use contracts::system::auth::TokenClaims;
use contracts::system::users::UserRole;

/// Token from an `Authorization: Bearer ...` header, owned so that the
/// request is not borrowed across `.await`.
fn bearer_token(req: &Request<Body>) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

async fn authenticate(token: Option<String>) -> Result<TokenClaims, StatusCode> {
    let token = token.ok_or(StatusCode::UNAUTHORIZED)?;
    super::jwt::validate_token(&token)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)
}

/// Admins pass every role check.
pub fn role_allowed(role: UserRole, allowed: &[UserRole]) -> bool {
    role.is_admin() || allowed.contains(&role)
}

async fn require_roles(
    mut req: Request<Body>,
    next: Next,
    allowed: &[UserRole],
) -> Result<Response, StatusCode> {
    let claims = authenticate(bearer_token(&req)).await?;
    if !role_allowed(claims.role, allowed) {
        return Err(StatusCode::FORBIDDEN);
    }
    // Add claims to request extensions for use in handlers
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Middleware that requires valid JWT authentication
pub async fn require_auth(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let claims = authenticate(bearer_token(&req)).await?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Middleware that requires admin or super admin
pub async fn require_admin(req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    require_roles(req, next, &[]).await
}

pub async fn require_customer(req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    require_roles(req, next, &[UserRole::Customer]).await
}

pub async fn require_delivery_partner(
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    require_roles(req, next, &[UserRole::DeliveryPartner]).await
}

pub async fn require_dark_store_owner(
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    require_roles(req, next, &[UserRole::DarkStoreOwner]).await
}

/// Attaches claims when a valid token is present, never rejects
pub async fn optional_auth(mut req: Request<Body>, next: Next) -> Response {
    if let Ok(claims) = authenticate(bearer_token(&req)).await {
        req.extensions_mut().insert(claims);
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_allowed() {
        assert!(role_allowed(UserRole::Admin, &[]));
        assert!(role_allowed(UserRole::SuperAdmin, &[UserRole::DeliveryPartner]));
        assert!(role_allowed(UserRole::DeliveryPartner, &[UserRole::DeliveryPartner]));
        assert!(!role_allowed(UserRole::Customer, &[UserRole::DeliveryPartner]));
        assert!(!role_allowed(UserRole::DarkStoreOwner, &[]));
    }

    fn request_with(header: Option<&str>) -> Request<Body> {
        let mut builder = axum::http::Request::builder().uri("/api/orders");
        if let Some(value) = header {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(
            bearer_token(&request_with(Some("Bearer abc.def"))),
            Some("abc.def".to_string())
        );
        assert_eq!(bearer_token(&request_with(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&request_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&request_with(None)), None);
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn test_middleware_futures_are_send() {
        assert_send(&authenticate(None));
        assert_send(&authenticate(bearer_token(&request_with(Some("Bearer x")))));
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        assert_eq!(authenticate(None).await.err(), Some(StatusCode::UNAUTHORIZED));
    }
}
