use anyhow::{Context, Result};
use contracts::system::users::{User, UserRole};
use sea_orm::{ConnectionTrait, DatabaseBackend, QueryResult, Statement};

use crate::shared::data::db::get_connection;

const USER_COLUMNS: &str = "id, username, email, phone, full_name, role, is_active, is_suspended, \
     is_locked, failed_login_attempts, created_at, updated_at, last_login_at, created_by";

fn flag(value: bool) -> i32 {
    if value {
        1
    } else {
        0
    }
}

fn row_to_user(row: &QueryResult) -> Result<User> {
    let role: String = row.try_get("", "role")?;
    Ok(User {
        id: row.try_get("", "id")?,
        username: row.try_get("", "username")?,
        email: row.try_get("", "email")?,
        phone: row.try_get("", "phone")?,
        full_name: row.try_get("", "full_name")?,
        role: UserRole::parse(&role).map_err(|e| anyhow::anyhow!(e))?,
        is_active: row.try_get::<i32>("", "is_active")? != 0,
        is_suspended: row.try_get::<i32>("", "is_suspended")? != 0,
        is_locked: row.try_get::<i32>("", "is_locked")? != 0,
        failed_login_attempts: row.try_get("", "failed_login_attempts")?,
        created_at: row.try_get("", "created_at")?,
        updated_at: row.try_get("", "updated_at")?,
        last_login_at: row.try_get("", "last_login_at")?,
        created_by: row.try_get("", "created_by")?,
    })
}

async fn query_one_user(sql: String, value: &str) -> Result<Option<User>> {
    let row = get_connection()
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            &sql,
            [value.into()],
        ))
        .await?;
    row.as_ref().map(row_to_user).transpose()
}

async fn execute(sql: &str, values: Vec<sea_orm::Value>) -> Result<u64> {
    let result = get_connection()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            sql,
            values,
        ))
        .await?;
    Ok(result.rows_affected())
}

/// Create user with password hash
pub async fn create_with_password(user: &User, password_hash: &str) -> Result<()> {
    execute(
        "INSERT INTO sys_users (id, username, email, phone, password_hash, full_name, role, is_active,
             is_suspended, is_locked, failed_login_attempts, created_at, updated_at, last_login_at, created_by)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, 0, 0, ?, ?, ?, ?)",
        vec![
            user.id.clone().into(),
            user.username.clone().into(),
            user.email.clone().into(),
            user.phone.clone().into(),
            password_hash.to_string().into(),
            user.full_name.clone().into(),
            user.role.as_str().into(),
            flag(user.is_active).into(),
            user.created_at.clone().into(),
            user.updated_at.clone().into(),
            user.last_login_at.clone().into(),
            user.created_by.clone().into(),
        ],
    )
    .await
    .context("Failed to insert user")?;
    Ok(())
}

pub async fn get_by_id(id: &str) -> Result<Option<User>> {
    query_one_user(
        format!("SELECT {} FROM sys_users WHERE id = ?", USER_COLUMNS),
        id,
    )
    .await
}

pub async fn get_by_username(username: &str) -> Result<Option<User>> {
    query_one_user(
        format!("SELECT {} FROM sys_users WHERE username = ?", USER_COLUMNS),
        username,
    )
    .await
}

/// Get password hash for user
pub async fn get_password_hash(user_id: &str) -> Result<Option<String>> {
    let row = get_connection()
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT password_hash FROM sys_users WHERE id = ?",
            [user_id.into()],
        ))
        .await?;

    match row {
        Some(row) => Ok(Some(row.try_get("", "password_hash")?)),
        None => Ok(None),
    }
}

/// List users, newest first, optionally restricted to one role
pub async fn list_all(role: Option<UserRole>) -> Result<Vec<User>> {
    let statement = match role {
        Some(role) => Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            &format!(
                "SELECT {} FROM sys_users WHERE role = ? ORDER BY created_at DESC",
                USER_COLUMNS
            ),
            [role.as_str().into()],
        ),
        None => Statement::from_string(
            DatabaseBackend::Sqlite,
            format!("SELECT {} FROM sys_users ORDER BY created_at DESC", USER_COLUMNS),
        ),
    };

    let rows = get_connection().query_all(statement).await?;
    rows.iter().map(row_to_user).collect()
}

pub async fn update(user: &User) -> Result<()> {
    execute(
        "UPDATE sys_users
         SET email = ?, phone = ?, full_name = ?, role = ?, is_active = ?, updated_at = ?
         WHERE id = ?",
        vec![
            user.email.clone().into(),
            user.phone.clone().into(),
            user.full_name.clone().into(),
            user.role.as_str().into(),
            flag(user.is_active).into(),
            user.updated_at.clone().into(),
            user.id.clone().into(),
        ],
    )
    .await
    .context("Failed to update user")?;
    Ok(())
}

/// Delete user (hard delete)
pub async fn delete(id: &str) -> Result<bool> {
    let affected = execute("DELETE FROM sys_users WHERE id = ?", vec![id.into()])
        .await
        .context("Failed to delete user")?;
    Ok(affected > 0)
}

/// Successful login: stamps the time and clears the failure counter
pub async fn record_successful_login(id: &str) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    execute(
        "UPDATE sys_users SET last_login_at = ?, failed_login_attempts = 0 WHERE id = ?",
        vec![now.into(), id.into()],
    )
    .await
    .context("Failed to update last login")?;
    Ok(())
}

/// Stores the failure counter and lock flag after a bad password
pub async fn record_failed_login(id: &str, attempts: i32, lock: bool) -> Result<()> {
    execute(
        "UPDATE sys_users SET failed_login_attempts = ?, is_locked = ? WHERE id = ?",
        vec![attempts.into(), flag(lock).into(), id.into()],
    )
    .await
    .context("Failed to record failed login")?;
    Ok(())
}

pub async fn set_suspended(id: &str, suspended: bool) -> Result<bool> {
    let affected = execute(
        "UPDATE sys_users SET is_suspended = ?, updated_at = ? WHERE id = ?",
        vec![
            flag(suspended).into(),
            chrono::Utc::now().to_rfc3339().into(),
            id.into(),
        ],
    )
    .await?;
    Ok(affected > 0)
}

pub async fn unlock(id: &str) -> Result<bool> {
    let affected = execute(
        "UPDATE sys_users SET is_locked = 0, failed_login_attempts = 0, updated_at = ? WHERE id = ?",
        vec![chrono::Utc::now().to_rfc3339().into(), id.into()],
    )
    .await?;
    Ok(affected > 0)
}

/// Count total users
pub async fn count_users() -> Result<usize> {
    let row = get_connection()
        .query_one(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT COUNT(*) as count FROM sys_users".to_string(),
        ))
        .await?;

    match row {
        Some(row) => {
            let count: i64 = row.try_get("", "count")?;
            Ok(count as usize)
        }
        None => Ok(0),
    }
}

/// Active, non-suspended users of a role
pub async fn count_active_by_role(role: UserRole) -> Result<i64> {
    let row = get_connection()
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT COUNT(*) as count FROM sys_users WHERE role = ? AND is_active = 1 AND is_suspended = 0",
            [role.as_str().into()],
        ))
        .await?;

    match row {
        Some(row) => Ok(row.try_get("", "count")?),
        None => Ok(0),
    }
}

/// Update user password
pub async fn update_password(id: &str, password_hash: &str) -> Result<()> {
    execute(
        "UPDATE sys_users SET password_hash = ?, updated_at = ? WHERE id = ?",
        vec![
            password_hash.into(),
            chrono::Utc::now().to_rfc3339().into(),
            id.into(),
        ],
    )
    .await
    .context("Failed to update password")?;
    Ok(())
}
