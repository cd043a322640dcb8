use super::repository;
use chrono::Utc;
use contracts::domain::a007_popup::aggregate::{Popup, PopupDto};
use contracts::system::users::UserRole;
use uuid::Uuid;

use crate::shared::api_error::{bad_request, not_found};

pub async fn create(dto: PopupDto) -> anyhow::Result<Uuid> {
    let mut aggregate = Popup::new_for_insert(&dto);
    aggregate.validate().map_err(bad_request)?;
    aggregate.before_write();
    repository::insert(&aggregate).await
}

pub async fn update(dto: PopupDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| bad_request("Invalid ID"))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| not_found("Popup"))?;

    aggregate.update(&dto);
    aggregate.validate().map_err(bad_request)?;
    aggregate.before_write();

    repository::update(&aggregate).await
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Popup>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<Popup>> {
    repository::list_all().await
}

/// Popups to show right now to a visitor with `role` (anonymous when `None`)
pub async fn list_active(role: Option<UserRole>) -> anyhow::Result<Vec<Popup>> {
    let now = Utc::now();
    Ok(repository::list_all()
        .await?
        .into_iter()
        .filter(|p| p.is_visible(role, now))
        .collect())
}
