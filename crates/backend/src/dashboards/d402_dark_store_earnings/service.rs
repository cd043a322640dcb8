use anyhow::Result;
use chrono::NaiveDate;
use contracts::dashboards::d402_dark_store_earnings::dto::{
    month_bounds, DailyEarnings, DarkStoreEarningsRequest, DarkStoreEarningsResponse,
};
use contracts::domain::a003_dark_store::aggregate::DarkStore;
use contracts::domain::a005_order::aggregate::{Order, OrderStatus};
use contracts::system::auth::TokenClaims;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::{a003_dark_store, a005_order};
use crate::shared::api_error::{bad_request, not_found};
use crate::shared::format::to_local;

/// Earnings of one store for the month; only delivered orders count.
pub fn compute(store: &DarkStore, orders: &[Order], year: i32, month: u32) -> DarkStoreEarningsResponse {
    let (first, last) = month_bounds(year, month);
    let store_id = store.base.id.value().to_string();

    let mut days: BTreeMap<String, DailyEarnings> = BTreeMap::new();
    for order in orders {
        if order.status != OrderStatus::Delivered || order.dark_store_id.as_deref() != Some(store_id.as_str()) {
            continue;
        }
        let Some(delivered_at) = order.delivered_at else {
            continue;
        };
        let date = to_local(delivered_at).date().format("%Y-%m-%d").to_string();
        if date < first || date > last {
            continue;
        }
        let day = days.entry(date.clone()).or_insert_with(|| DailyEarnings {
            date,
            orders: 0,
            jars: 0,
        });
        day.orders += 1;
        day.jars += i64::from(order.pricing.jar_count);
    }

    let orders_count = days.values().map(|d| d.orders).sum();
    let jars: i64 = days.values().map(|d| d.jars).sum();

    DarkStoreEarningsResponse {
        period: format!("{:04}-{:02}", year, month),
        store_id,
        store_name: store.base.description.clone(),
        payment_model: store.payment_model,
        orders: orders_count,
        jars_delivered: jars,
        earnings: store.earnings_for(jars),
        days: days.into_values().collect(),
    }
}

async fn resolve_store(request: &DarkStoreEarningsRequest, claims: &TokenClaims) -> Result<DarkStore> {
    match request.store_id.as_deref().filter(|_| claims.is_admin()) {
        Some(id) => {
            let id = Uuid::parse_str(id).map_err(|_| bad_request("Invalid store id"))?;
            a003_dark_store::service::get_by_id(id)
                .await?
                .ok_or_else(|| not_found("Dark store"))
        }
        None => a003_dark_store::service::get_for_owner(&claims.sub).await,
    }
}

pub async fn get_earnings(
    request: DarkStoreEarningsRequest,
    claims: &TokenClaims,
) -> Result<DarkStoreEarningsResponse> {
    if NaiveDate::from_ymd_opt(request.year, request.month, 1).is_none() {
        return Err(bad_request("Invalid year or month"));
    }
    let store = resolve_store(&request, claims).await?;
    let orders = a005_order::service::list_by_dark_store(&store.base.id.value().to_string()).await?;
    Ok(compute(&store, &orders, request.year, request.month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use contracts::domain::a001_product::aggregate::ProductType;
    use contracts::domain::a003_dark_store::aggregate::{DarkStoreDto, PaymentModel, StoreOwner};
    use contracts::domain::a005_order::aggregate::{DeliveryAddress, OrderItem, PaymentMethod};
    use contracts::shared::pricing::OrderPricing;

    fn store() -> DarkStore {
        DarkStore::new_for_insert(&DarkStoreDto {
            id: None,
            code: None,
            description: "HSR hub".into(),
            owner: StoreOwner {
                name: "Owner".into(),
                phone: "9876543210".into(),
                email: None,
                user_id: None,
            },
            address: "HSR Layout".into(),
            payment_model: PaymentModel::PerJar,
            per_jar_rate: Some(800),
            monthly_rent: None,
            pincodes: vec!["560102".into()],
            stock: None,
            is_active: true,
            comment: None,
        })
    }

    fn order(store_id: &str, jars: u32, delivered_at: Option<&str>) -> Order {
        let mut o = Order::new_from_checkout(
            "c1".into(),
            vec![OrderItem {
                product_id: "p".into(),
                product_type: ProductType::Jar20L,
                name: "Jar".into(),
                unit_price: 6000,
                quantity: jars,
                security_deposit_per_unit: None,
                is_one_time_purchase: false,
            }],
            DeliveryAddress {
                line1: "1 Main St".into(),
                line2: None,
                city: "Bengaluru".into(),
                pincode: "560102".into(),
                floor: 0,
                contact_phone: None,
            },
            OrderPricing {
                jar_count: jars,
                ..Default::default()
            },
            PaymentMethod::Cod,
            None,
            Some(store_id.to_string()),
        );
        if let Some(at) = delivered_at {
            let at = DateTime::parse_from_rfc3339(at).unwrap().with_timezone(&Utc);
            o.assign("partner", at).unwrap();
            o.mark_delivered(at).unwrap();
        }
        o
    }

    #[test]
    fn test_per_jar_earnings_by_day() {
        let s = store();
        let id = s.base.id.value().to_string();
        let orders = vec![
            order(&id, 2, Some("2025-02-03T05:00:00Z")),
            order(&id, 3, Some("2025-02-03T09:00:00Z")),
            order(&id, 1, Some("2025-02-10T05:00:00Z")),
            // 20:00Z on Jan 31 is already Feb 1 in IST
            order(&id, 4, Some("2025-01-31T20:00:00Z")),
            order(&id, 5, Some("2025-03-01T05:00:00Z")),
            order(&id, 7, None),
            order("other-store", 9, Some("2025-02-03T05:00:00Z")),
        ];

        let r = compute(&s, &orders, 2025, 2);
        assert_eq!(r.period, "2025-02");
        assert_eq!(r.orders, 4);
        assert_eq!(r.jars_delivered, 10);
        assert_eq!(r.earnings, 8000);
        assert_eq!(r.days.len(), 3);
        assert_eq!(r.days[0].date, "2025-02-01");
        assert_eq!(r.days[1].jars, 5);
    }

    #[test]
    fn test_rent_model_is_flat() {
        let mut s = store();
        s.payment_model = PaymentModel::Rent;
        s.monthly_rent = 1_500_000;
        let r = compute(&s, &[], 2025, 2);
        assert_eq!(r.earnings, 1_500_000);
        assert!(r.days.is_empty());
    }
}
