use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use contracts::system::auth::TokenClaims;
use contracts::system::users::UserRole;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use crate::shared::config::get_config;
use crate::shared::data::db::get_connection;

const JWT_SECRET_KEY: &str = "jwt_secret";

pub fn build_claims(
    user_id: &str,
    username: &str,
    role: UserRole,
    now: DateTime<Utc>,
    lifetime_hours: i64,
) -> TokenClaims {
    TokenClaims {
        sub: user_id.to_string(),
        username: username.to_string(),
        role,
        exp: (now + chrono::Duration::hours(lifetime_hours)).timestamp() as usize,
        iat: now.timestamp() as usize,
    }
}

pub fn encode_claims(claims: &TokenClaims, secret: &str) -> Result<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT token")
}

pub fn decode_claims(token: &str, secret: &str) -> Result<TokenClaims> {
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT token")?;
    Ok(token_data.claims)
}

/// Generate JWT access token
pub async fn generate_access_token(user_id: &str, username: &str, role: UserRole) -> Result<String> {
    let lifetime = get_config().auth.access_token_hours;
    let claims = build_claims(user_id, username, role, Utc::now(), lifetime);
    let secret = get_jwt_secret().await?;
    encode_claims(&claims, &secret)
}

/// Validate JWT token and extract claims
pub async fn validate_token(token: &str) -> Result<TokenClaims> {
    let secret = get_jwt_secret().await?;
    decode_claims(token, &secret)
}

/// Generate refresh token (UUID-based)
pub fn generate_refresh_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Get or create JWT secret from database
pub async fn get_jwt_secret() -> Result<String> {
    match get_jwt_secret_from_db().await {
        Ok(Some(secret)) => Ok(secret),
        Ok(None) => {
            let secret = generate_jwt_secret();
            save_jwt_secret_to_db(&secret).await?;
            tracing::info!("Generated new JWT secret");
            Ok(secret)
        }
        Err(e) => Err(e.context("Failed to read JWT secret")),
    }
}

/// Generate a cryptographically secure JWT secret (256 bits)
fn generate_jwt_secret() -> String {
    use base64::{engine::general_purpose, Engine as _};
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen::<u8>()).collect();
    general_purpose::STANDARD.encode(&random_bytes)
}

async fn get_jwt_secret_from_db() -> Result<Option<String>> {
    let result = get_connection()
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT value FROM sys_settings WHERE key = ?",
            [JWT_SECRET_KEY.into()],
        ))
        .await?;

    match result {
        Some(row) => Ok(Some(row.try_get("", "value")?)),
        None => Ok(None),
    }
}

async fn save_jwt_secret_to_db(secret: &str) -> Result<()> {
    let now = Utc::now().to_rfc3339();

    // OR IGNORE: a concurrent first request may have stored one already
    get_connection()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "INSERT OR IGNORE INTO sys_settings (key, value, description, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            [
                JWT_SECRET_KEY.into(),
                secret.to_string().into(),
                "Auto-generated JWT secret for authentication".into(),
                now.clone().into(),
                now.into(),
            ],
        ))
        .await?;

    Ok(())
}

/// Calculate refresh token expiration timestamp
pub fn calculate_refresh_token_expiration(now: DateTime<Utc>, lifetime_days: i64) -> String {
    (now + chrono::Duration::days(lifetime_days)).to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let claims = build_claims("u-1", "ravi", UserRole::DeliveryPartner, Utc::now(), 24);
        let token = encode_claims(&claims, "s3cret").unwrap();
        let decoded = decode_claims(&token, "s3cret").unwrap();
        assert_eq!(decoded.sub, "u-1");
        assert_eq!(decoded.role, UserRole::DeliveryPartner);
        assert!(!decoded.is_admin());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let claims = build_claims("u-1", "ravi", UserRole::Admin, Utc::now(), 24);
        let token = encode_claims(&claims, "s3cret").unwrap();
        assert!(decode_claims(&token, "other").is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issued = Utc::now() - chrono::Duration::hours(48);
        let claims = build_claims("u-1", "ravi", UserRole::Customer, issued, 24);
        let token = encode_claims(&claims, "s3cret").unwrap();
        assert!(decode_claims(&token, "s3cret").is_err());
    }

    #[test]
    fn test_secret_is_256_bits() {
        use base64::{engine::general_purpose, Engine as _};
        let secret = generate_jwt_secret();
        assert_eq!(general_purpose::STANDARD.decode(secret).unwrap().len(), 32);
    }
}
