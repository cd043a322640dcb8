use super::repository;
use contracts::domain::a008_contact_submission::aggregate::{
    ContactStatus, ContactSubmission, ContactSubmissionDto,
};
use contracts::shared::validation::normalize_phone;
use uuid::Uuid;

use crate::shared::api_error::{bad_request, not_found};

/// Public contact form
pub async fn create(dto: ContactSubmissionDto) -> anyhow::Result<Uuid> {
    let mut aggregate = ContactSubmission::new_for_insert(&dto);
    aggregate.phone = aggregate
        .phone
        .map(|p| normalize_phone(&p).unwrap_or(p));
    aggregate.validate().map_err(bad_request)?;
    aggregate.before_write();

    let id = repository::insert(&aggregate).await?;
    tracing::info!("Contact submission {} from {}", aggregate.base.code, aggregate.email);
    Ok(id)
}

pub async fn set_status(id: Uuid, status: ContactStatus) -> anyhow::Result<()> {
    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| not_found("Contact submission"))?;
    aggregate.status = status;
    aggregate.before_write();
    repository::update(&aggregate).await
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<ContactSubmission>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<ContactSubmission>> {
    repository::list_all().await
}

pub async fn count_new() -> anyhow::Result<u64> {
    repository::count_by_status(ContactStatus::New).await
}
