use anyhow::{Context, Result};
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use crate::shared::data::db::get_connection;

const SYSTEM_MIGRATION: &str = include_str!("../../migrate_system.sql");

/// Splits a migration script into statements, dropping comment lines
fn migration_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|statement| {
            statement
                .lines()
                .filter(|line| {
                    let trimmed_line = line.trim();
                    !trimmed_line.is_empty() && !trimmed_line.starts_with("--")
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|statement| !statement.trim().is_empty())
        .collect()
}

/// Creates the sys_* tables
pub async fn apply_system_migration() -> Result<()> {
    let conn = get_connection();

    // SQLite doesn't support execute_batch in sea-orm
    for (idx, statement) in migration_statements(SYSTEM_MIGRATION).iter().enumerate() {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            format!("{};", statement.trim()),
        ))
        .await
        .with_context(|| {
            format!(
                "Failed to execute statement #{}: {}",
                idx,
                statement.lines().take(3).collect::<Vec<_>>().join(" ")
            )
        })?;
    }

    tracing::info!("System migration applied");
    Ok(())
}

/// Ensure admin user exists (create if table is empty)
pub async fn ensure_admin_user_exists() -> Result<()> {
    use crate::system::users::{repository, service};
    use contracts::system::users::{CreateUserDto, UserRole};

    let count = repository::count_users().await?;

    if count == 0 {
        tracing::info!("No users found. Creating default admin user...");

        let admin_dto = CreateUserDto {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            email: None,
            phone: None,
            full_name: Some("Administrator".to_string()),
            role: UserRole::SuperAdmin,
        };

        let admin_id = service::create(admin_dto, None).await?;

        tracing::warn!("Default super admin created (id {})", admin_id);
        tracing::warn!("Username: admin, password: admin123. Change the password now.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_statements() {
        let statements = migration_statements(SYSTEM_MIGRATION);
        assert!(statements
            .iter()
            .any(|s| s.starts_with("CREATE TABLE IF NOT EXISTS sys_users")));
        assert!(statements
            .iter()
            .any(|s| s.starts_with("CREATE TABLE IF NOT EXISTS sys_email_outbox")));
        assert!(statements.iter().all(|s| !s.contains("--")));
    }
}
