use super::repository;
use contracts::domain::a001_product::aggregate::{Product, ProductDto};
use uuid::Uuid;

use crate::shared::api_error::{bad_request, not_found};

pub async fn create(dto: ProductDto) -> anyhow::Result<Uuid> {
    let mut aggregate = Product::new_for_insert(&dto);
    aggregate.validate().map_err(bad_request)?;
    aggregate.before_write();

    let id = repository::insert(&aggregate).await?;
    tracing::info!("Product {} created ({})", aggregate.base.description, id);
    Ok(id)
}

pub async fn update(dto: ProductDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| bad_request("Invalid ID"))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| not_found("Product"))?;

    aggregate.update(&dto);
    aggregate.validate().map_err(bad_request)?;
    aggregate.before_write();

    repository::update(&aggregate).await
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Product>> {
    repository::get_by_id(id).await
}

/// Catalog listing; customers only see active products
pub async fn list_all(active_only: bool) -> anyhow::Result<Vec<Product>> {
    repository::list_all(active_only).await
}
