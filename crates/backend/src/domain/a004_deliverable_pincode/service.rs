use super::repository;
use contracts::domain::a004_deliverable_pincode::aggregate::{
    DeliverablePincode, DeliverablePincodeDto, PincodeCheckResponse,
};
use contracts::shared::validation::is_valid_pincode;
use uuid::Uuid;

use crate::domain::a003_dark_store;
use crate::shared::api_error::{bad_request, conflict, not_found};

async fn check_references(aggregate: &DeliverablePincode) -> anyhow::Result<()> {
    if let Some(existing) = repository::get_by_pincode(aggregate.pincode()).await? {
        if existing.base.id != aggregate.base.id {
            return Err(conflict(format!(
                "Pincode {} already exists",
                aggregate.pincode()
            )));
        }
    }
    if let Some(store_id) = aggregate.dark_store_id.as_deref() {
        let store_id = Uuid::parse_str(store_id).map_err(|_| bad_request("Invalid dark store id"))?;
        if a003_dark_store::service::get_by_id(store_id).await?.is_none() {
            return Err(not_found("Dark store"));
        }
    }
    Ok(())
}

pub async fn create(dto: DeliverablePincodeDto) -> anyhow::Result<Uuid> {
    let mut aggregate = DeliverablePincode::new_for_insert(&dto);
    aggregate.validate().map_err(bad_request)?;
    check_references(&aggregate).await?;
    aggregate.before_write();

    let id = repository::insert(&aggregate).await?;
    tracing::info!("Pincode {} opened for delivery", aggregate.pincode());
    Ok(id)
}

pub async fn update(dto: DeliverablePincodeDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| bad_request("Invalid ID"))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| not_found("Pincode"))?;

    aggregate.update(&dto);
    aggregate.validate().map_err(bad_request)?;
    check_references(&aggregate).await?;
    aggregate.before_write();

    repository::update(&aggregate).await
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<DeliverablePincode>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<DeliverablePincode>> {
    repository::list_all().await
}

/// The pincode record when delivery is currently possible there
pub async fn find_deliverable(pincode: &str) -> anyhow::Result<Option<DeliverablePincode>> {
    let pincode = pincode.trim();
    if !is_valid_pincode(pincode) {
        return Ok(None);
    }
    Ok(repository::get_by_pincode(pincode)
        .await?
        .filter(|p| p.is_active))
}

pub async fn check(pincode: &str) -> anyhow::Result<PincodeCheckResponse> {
    let found = find_deliverable(pincode).await?;
    Ok(PincodeCheckResponse {
        pincode: pincode.trim().to_string(),
        deliverable: found.is_some(),
        area: found.as_ref().map(|p| p.base.description.clone()),
        city: found.map(|p| p.city),
    })
}
