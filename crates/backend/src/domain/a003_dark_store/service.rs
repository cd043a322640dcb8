use super::repository;
use contracts::domain::a001_product::aggregate::ProductType;
use contracts::domain::a003_dark_store::aggregate::{
    DarkStore, DarkStoreDto, LowStockAlert, StockEntry,
};
use contracts::system::users::UserRole;
use uuid::Uuid;

use crate::shared::api_error::{bad_request, conflict, not_found};
use crate::system::users::service as users;

/// A pincode may be served by one active store only.
async fn ensure_pincodes_free(store: &DarkStore) -> anyhow::Result<()> {
    if !store.is_active {
        return Ok(());
    }
    for other in repository::list_all().await? {
        if other.base.id == store.base.id || !other.is_active {
            continue;
        }
        if let Some(p) = store.pincodes.iter().find(|p| other.serves(p)) {
            return Err(conflict(format!(
                "Pincode {} is already served by {}",
                p, other.base.description
            )));
        }
    }
    Ok(())
}

async fn check_owner_account(store: &DarkStore) -> anyhow::Result<()> {
    if let Some(user_id) = store.owner.user_id.as_deref().filter(|u| !u.is_empty()) {
        users::require_role(user_id, UserRole::DarkStoreOwner).await?;
    }
    Ok(())
}

pub async fn create(dto: DarkStoreDto) -> anyhow::Result<Uuid> {
    let mut aggregate = DarkStore::new_for_insert(&dto);
    aggregate.validate().map_err(bad_request)?;
    check_owner_account(&aggregate).await?;
    ensure_pincodes_free(&aggregate).await?;
    aggregate.before_write();

    let id = repository::insert(&aggregate).await?;
    tracing::info!("Dark store {} created ({})", aggregate.base.description, id);
    Ok(id)
}

pub async fn update(dto: DarkStoreDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| bad_request("Invalid ID"))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| not_found("Dark store"))?;

    aggregate.update(&dto);
    aggregate.validate().map_err(bad_request)?;
    check_owner_account(&aggregate).await?;
    ensure_pincodes_free(&aggregate).await?;
    aggregate.before_write();

    repository::update(&aggregate).await
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<DarkStore>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<DarkStore>> {
    repository::list_all().await
}

pub async fn get_for_owner(user_id: &str) -> anyhow::Result<DarkStore> {
    repository::get_by_owner(user_id)
        .await?
        .ok_or_else(|| not_found("Dark store"))
}

/// Active store whose pincode list contains `pincode`
pub async fn find_serving(pincode: &str) -> anyhow::Result<Option<DarkStore>> {
    Ok(repository::list_all()
        .await?
        .into_iter()
        .find(|s| s.is_active && s.serves(pincode)))
}

pub async fn set_stock(id: Uuid, entry: StockEntry) -> anyhow::Result<DarkStore> {
    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| not_found("Dark store"))?;

    aggregate.set_stock(entry);
    aggregate.validate().map_err(bad_request)?;
    aggregate.before_write();
    repository::update(&aggregate).await?;
    Ok(aggregate)
}

/// Called when an order from this store is delivered.
pub async fn consume_stock(id: Uuid, consumed: &[(ProductType, i64)]) -> anyhow::Result<()> {
    let Some(mut aggregate) = repository::get_by_id(id).await? else {
        tracing::warn!("Dark store {} not found while consuming stock", id);
        return Ok(());
    };
    for (product_type, quantity) in consumed {
        aggregate.consume_stock(*product_type, *quantity);
    }
    for entry in aggregate.low_stock() {
        tracing::warn!(
            "Low stock at {}: {} {} left",
            aggregate.base.description,
            entry.quantity,
            entry.product_type
        );
    }
    aggregate.before_write();
    repository::update(&aggregate).await
}

pub fn low_stock_alerts(stores: &[DarkStore]) -> Vec<LowStockAlert> {
    stores
        .iter()
        .filter(|s| s.is_active)
        .flat_map(|s| {
            s.low_stock().into_iter().map(move |e| LowStockAlert {
                store_id: s.base.id.value().to_string(),
                store_name: s.base.description.clone(),
                product_type: e.product_type,
                quantity: e.quantity,
                threshold: e.threshold,
            })
        })
        .collect()
}

pub async fn list_low_stock() -> anyhow::Result<Vec<LowStockAlert>> {
    Ok(low_stock_alerts(&repository::list_all().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a003_dark_store::aggregate::{PaymentModel, StoreOwner};

    fn store(name: &str, active: bool, quantity: i64) -> DarkStore {
        DarkStore::new_for_insert(&DarkStoreDto {
            id: None,
            code: None,
            description: name.into(),
            owner: StoreOwner {
                name: "Owner".into(),
                phone: "9876543210".into(),
                email: None,
                user_id: None,
            },
            address: "Main road".into(),
            payment_model: PaymentModel::Rent,
            per_jar_rate: None,
            monthly_rent: Some(1_000_000),
            pincodes: vec!["560001".into()],
            stock: Some(vec![StockEntry {
                product_type: ProductType::Jar20L,
                quantity,
                capacity: 100,
                threshold: 10,
            }]),
            is_active: active,
            comment: None,
        })
    }

    #[test]
    fn test_low_stock_alerts_skip_inactive_stores() {
        let stores = vec![
            store("Indiranagar", true, 5),
            store("Whitefield", true, 50),
            store("Closed", false, 0),
        ];
        let alerts = low_stock_alerts(&stores);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].store_name, "Indiranagar");
        assert_eq!(alerts[0].quantity, 5);
        assert_eq!(alerts[0].threshold, 10);
    }
}
