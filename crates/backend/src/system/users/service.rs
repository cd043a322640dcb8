use anyhow::Result;
use chrono::Utc;
use contracts::shared::validation::{is_valid_email, is_valid_phone, normalize_phone};
use contracts::system::auth::TokenClaims;
use contracts::system::users::{ChangePasswordDto, CreateUserDto, UpdateUserDto, User, UserRole};
use thiserror::Error;

use super::repository;
use crate::shared::api_error::{bad_request, conflict, forbidden, not_found};
use crate::shared::config::get_config;
use crate::system::auth::password;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("{0}")]
    Blocked(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Only a super admin may hand out admin roles.
fn ensure_can_assign(role: UserRole, requester: Option<&TokenClaims>) -> Result<()> {
    match requester {
        Some(claims) if role.is_admin() && claims.role != UserRole::SuperAdmin => {
            Err(forbidden("Only a super admin can assign admin roles"))
        }
        _ => Ok(()),
    }
}

fn validate_contact(email: Option<&str>, phone: Option<&str>) -> Result<()> {
    if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
        if !is_valid_email(email) {
            return Err(bad_request("Invalid email format"));
        }
    }
    if let Some(phone) = phone.filter(|p| !p.trim().is_empty()) {
        if !is_valid_phone(phone) {
            return Err(bad_request("Phone must be a 10-digit number"));
        }
    }
    Ok(())
}

fn clean_phone(phone: Option<String>) -> Option<String> {
    phone
        .filter(|p| !p.trim().is_empty())
        .map(|p| normalize_phone(&p).unwrap_or(p))
}

/// Lock after the configured number of consecutive failures
pub fn should_lock(failed_attempts: i32, max_failed_logins: i32) -> bool {
    max_failed_logins > 0 && failed_attempts >= max_failed_logins
}

/// Create a new user; `requester` is None for bootstrap and self-registration
pub async fn create(dto: CreateUserDto, requester: Option<&TokenClaims>) -> Result<String> {
    let username = dto.username.trim().to_string();
    if username.is_empty() {
        return Err(bad_request("Username cannot be empty"));
    }
    ensure_can_assign(dto.role, requester)?;

    if repository::get_by_username(&username).await?.is_some() {
        return Err(conflict("Username already exists"));
    }

    validate_contact(dto.email.as_deref(), dto.phone.as_deref())?;
    password::validate_password_strength(&dto.password)?;
    let password_hash = password::hash_password(&dto.password)?;

    let user_id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let user = User {
        id: user_id.clone(),
        username,
        email: dto.email.filter(|e| !e.trim().is_empty()),
        phone: clean_phone(dto.phone),
        full_name: dto.full_name,
        role: dto.role,
        is_active: true,
        is_suspended: false,
        is_locked: false,
        failed_login_attempts: 0,
        created_at: now.clone(),
        updated_at: now,
        last_login_at: None,
        created_by: requester.map(|c| c.sub.clone()),
    };

    repository::create_with_password(&user, &password_hash).await?;
    tracing::info!("Created user {} with role {}", user.username, user.role.as_str());

    Ok(user_id)
}

pub async fn update(dto: UpdateUserDto, requester: &TokenClaims) -> Result<()> {
    let mut user = repository::get_by_id(&dto.id)
        .await?
        .ok_or_else(|| not_found("User"))?;

    if user.role != dto.role || user.role.is_admin() {
        ensure_can_assign(dto.role, Some(requester))?;
        ensure_can_assign(user.role, Some(requester))?;
    }
    validate_contact(dto.email.as_deref(), dto.phone.as_deref())?;

    user.email = dto.email.filter(|e| !e.trim().is_empty());
    user.phone = clean_phone(dto.phone);
    user.full_name = dto.full_name;
    user.role = dto.role;
    user.is_active = dto.is_active;
    user.updated_at = Utc::now().to_rfc3339();

    repository::update(&user).await
}

pub async fn delete(id: &str, requester: &TokenClaims) -> Result<bool> {
    if id == requester.sub {
        return Err(bad_request("You cannot delete your own account"));
    }
    if let Some(user) = repository::get_by_id(id).await? {
        ensure_can_assign(user.role, Some(requester))?;
    }
    repository::delete(id).await
}

pub async fn get_by_id(id: &str) -> Result<Option<User>> {
    repository::get_by_id(id).await
}

pub async fn list_all(role: Option<UserRole>) -> Result<Vec<User>> {
    repository::list_all(role).await
}

/// Loads a user that must exist and have the given role
pub async fn require_role(id: &str, role: UserRole) -> Result<User> {
    let user = repository::get_by_id(id)
        .await?
        .ok_or_else(|| not_found("User"))?;
    if user.role != role {
        return Err(bad_request(format!(
            "User {} is not a {}",
            user.username,
            role.as_str()
        )));
    }
    if user.login_block_reason().is_some() {
        return Err(bad_request(format!("User {} is not active", user.username)));
    }
    Ok(user)
}

pub async fn set_suspended(id: &str, suspended: bool, requester: &TokenClaims) -> Result<()> {
    if id == requester.sub {
        return Err(bad_request("You cannot suspend your own account"));
    }
    let user = repository::get_by_id(id)
        .await?
        .ok_or_else(|| not_found("User"))?;
    ensure_can_assign(user.role, Some(requester))?;

    repository::set_suspended(id, suspended).await?;
    tracing::info!(
        "User {} {} by {}",
        user.username,
        if suspended { "suspended" } else { "unsuspended" },
        requester.username
    );
    Ok(())
}

pub async fn unlock(id: &str, requester: &TokenClaims) -> Result<()> {
    if !repository::unlock(id).await? {
        return Err(not_found("User"));
    }
    tracing::info!("User {} unlocked by {}", id, requester.username);
    Ok(())
}

/// Change user password
pub async fn change_password(dto: ChangePasswordDto, requester: &TokenClaims) -> Result<()> {
    let user = repository::get_by_id(&dto.user_id)
        .await?
        .ok_or_else(|| not_found("User"))?;

    if dto.user_id != requester.sub {
        // Changing someone else's password - must be admin
        if !requester.is_admin() {
            return Err(forbidden("Permission denied"));
        }
        ensure_can_assign(user.role, Some(requester))?;
    } else {
        let old_password = dto
            .old_password
            .as_deref()
            .ok_or_else(|| bad_request("Current password is required"))?;
        let current_hash = repository::get_password_hash(&dto.user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Password hash not found"))?;

        if !password::verify_password(old_password, &current_hash)? {
            return Err(bad_request("Invalid old password"));
        }
    }

    password::validate_password_strength(&dto.new_password)?;
    let new_hash = password::hash_password(&dto.new_password)?;
    repository::update_password(&dto.user_id, &new_hash).await?;

    tracing::info!("Password changed for {}", user.username);
    Ok(())
}

/// Verify user credentials (for login), counting failures towards the lock
pub async fn verify_credentials(username: &str, password: &str) -> Result<User, LoginError> {
    let user = repository::get_by_username(username.trim())
        .await?
        .ok_or(LoginError::InvalidCredentials)?;

    if let Some(reason) = user.login_block_reason() {
        tracing::warn!("Blocked login for {}: {}", user.username, reason);
        return Err(LoginError::Blocked(reason));
    }

    let password_hash = repository::get_password_hash(&user.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Password hash not found"))?;

    if !password::verify_password(password, &password_hash)? {
        let attempts = user.failed_login_attempts + 1;
        let lock = should_lock(attempts, get_config().auth.max_failed_logins);
        repository::record_failed_login(&user.id, attempts, lock).await?;
        if lock {
            tracing::warn!("User {} locked after {} failed logins", user.username, attempts);
        }
        return Err(LoginError::InvalidCredentials);
    }

    if let Err(e) = repository::record_successful_login(&user.id).await {
        tracing::warn!("Failed to record login for {}: {}", user.username, e);
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: UserRole) -> TokenClaims {
        TokenClaims {
            sub: "req".into(),
            username: "req".into(),
            role,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_should_lock() {
        assert!(!should_lock(4, 5));
        assert!(should_lock(5, 5));
        assert!(should_lock(6, 5));
        assert!(!should_lock(100, 0));
    }

    #[test]
    fn test_only_super_admin_assigns_admin_roles() {
        let admin = claims(UserRole::Admin);
        let root = claims(UserRole::SuperAdmin);
        assert!(ensure_can_assign(UserRole::DeliveryPartner, Some(&admin)).is_ok());
        assert!(ensure_can_assign(UserRole::Admin, Some(&admin)).is_err());
        assert!(ensure_can_assign(UserRole::Admin, Some(&root)).is_ok());
        assert!(ensure_can_assign(UserRole::SuperAdmin, None).is_ok());
    }

    #[test]
    fn test_validate_contact() {
        assert!(validate_contact(Some("a@b.in"), Some("98765 43210")).is_ok());
        assert!(validate_contact(Some(""), None).is_ok());
        assert!(validate_contact(Some("nope"), None).is_err());
        assert!(validate_contact(None, Some("12345")).is_err());
    }
}
