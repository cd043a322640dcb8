use anyhow::Result;
use chrono::Utc;
use contracts::system::email::{EmailStatus, SendEmailRequest};
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use crate::shared::data::db::get_connection;

/// Records one message in sys_email_outbox
pub async fn insert(
    id: &str,
    request: &SendEmailRequest,
    status: EmailStatus,
    error: Option<&str>,
    sent_by: &str,
) -> Result<()> {
    get_connection()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "INSERT INTO sys_email_outbox (id, recipients, subject, body, is_html, status, error, sent_by, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            [
                id.into(),
                request.to.join(", ").into(),
                request.subject.clone().into(),
                request.body.clone().into(),
                (if request.is_html { 1 } else { 0 }).into(),
                status.as_str().into(),
                error.map(str::to_string).into(),
                sent_by.into(),
                Utc::now().to_rfc3339().into(),
            ],
        ))
        .await?;
    Ok(())
}
