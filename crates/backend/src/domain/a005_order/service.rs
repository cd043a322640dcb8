use super::repository;
use chrono::Utc;
use contracts::domain::a001_product::aggregate::ProductType;
use contracts::domain::a005_order::aggregate::{
    Order, OrderListQuery, OrderListResponse, OrderStatus, PaymentMethod, PaymentStatus,
};
use contracts::shared::money::{format_rupees, Paise};
use contracts::system::auth::TokenClaims;
use contracts::system::users::UserRole;
use uuid::Uuid;

use crate::domain::{a003_dark_store, a009_wallet};
use crate::shared::api_error::{bad_request, forbidden, not_found};
use crate::system::users::service as users;

const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 200;

fn page_bounds(query: &OrderListQuery) -> (u64, u64) {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (limit, query.offset.unwrap_or(0))
}

async fn load(id: Uuid) -> anyhow::Result<Order> {
    repository::get_by_id(id)
        .await?
        .ok_or_else(|| not_found("Order"))
}

pub async fn list(query: OrderListQuery) -> anyhow::Result<OrderListResponse> {
    if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
        OrderStatus::parse(status).map_err(bad_request)?;
    }
    let (limit, offset) = page_bounds(&query);
    let (items, total) = repository::list_page(&query, limit, offset).await?;
    Ok(OrderListResponse {
        items,
        total,
        limit,
        offset,
    })
}

pub async fn list_for_customer(customer_id: &str) -> anyhow::Result<Vec<Order>> {
    repository::list_filtered(&OrderListQuery {
        customer_id: Some(customer_id.to_string()),
        ..Default::default()
    })
    .await
}

/// Orders of a delivery partner, open ones first
pub async fn list_for_partner(partner_id: &str) -> anyhow::Result<Vec<Order>> {
    let mut orders = repository::list_filtered(&OrderListQuery {
        delivery_partner_id: Some(partner_id.to_string()),
        ..Default::default()
    })
    .await?;
    orders.sort_by_key(|o| o.status != OrderStatus::Assigned);
    Ok(orders)
}

pub async fn list_all() -> anyhow::Result<Vec<Order>> {
    repository::list_all().await
}

pub async fn list_by_dark_store(store_id: &str) -> anyhow::Result<Vec<Order>> {
    repository::list_by_dark_store(store_id).await
}

/// Customers see their own orders, partners the ones assigned to them,
/// store owners the ones of their store.
pub async fn get_for(id: Uuid, claims: &TokenClaims) -> anyhow::Result<Order> {
    let order = load(id).await?;
    let allowed = match claims.role {
        UserRole::Admin | UserRole::SuperAdmin => true,
        UserRole::Customer => order.customer_id == claims.sub,
        UserRole::DeliveryPartner => order.delivery_partner_id.as_deref() == Some(claims.sub.as_str()),
        UserRole::DarkStoreOwner => {
            let store = a003_dark_store::service::get_for_owner(&claims.sub).await?;
            order.dark_store_id.as_deref() == Some(store.base.id.value().to_string().as_str())
        }
    };
    if !allowed {
        return Err(not_found("Order"));
    }
    Ok(order)
}

pub async fn assign(id: Uuid, delivery_partner_id: &str) -> anyhow::Result<Order> {
    let mut order = load(id).await?;
    let partner = users::require_role(delivery_partner_id, UserRole::DeliveryPartner).await?;

    order.assign(&partner.id, Utc::now()).map_err(bad_request)?;
    order.before_write();
    repository::update(&order).await?;
    tracing::info!("Order {} assigned to {}", order.base.code, partner.username);
    Ok(order)
}

fn consumed_stock(order: &Order) -> Vec<(ProductType, i64)> {
    ProductType::all()
        .iter()
        .map(|t| (*t, order.jars_of(*t)))
        .filter(|(_, qty)| *qty > 0)
        .collect()
}

pub async fn deliver(id: Uuid, claims: &TokenClaims) -> anyhow::Result<Order> {
    let mut order = load(id).await?;
    if !claims.is_admin() && order.delivery_partner_id.as_deref() != Some(claims.sub.as_str()) {
        return Err(forbidden("Order is not assigned to you"));
    }

    order.mark_delivered(Utc::now()).map_err(bad_request)?;
    order.before_write();
    repository::update(&order).await?;
    tracing::info!("Order {} delivered", order.base.code);

    if let Some(store_id) = order.dark_store_id.as_deref().and_then(|s| Uuid::parse_str(s).ok()) {
        a003_dark_store::service::consume_stock(store_id, &consumed_stock(&order)).await?;
    }
    Ok(order)
}

/// Customers may cancel their own orders while still pending.
pub async fn cancel(id: Uuid, reason: Option<String>, claims: &TokenClaims) -> anyhow::Result<Order> {
    let mut order = load(id).await?;
    if !claims.is_admin() {
        if order.customer_id != claims.sub {
            return Err(not_found("Order"));
        }
        if order.status != OrderStatus::Pending {
            return Err(bad_request("Only pending orders can be cancelled"));
        }
    }

    let refund = order.cancel(reason, Utc::now()).map_err(bad_request)?;
    order.before_write();
    refund_then_save(&order, refund, &format!("Refund for order {}", order.base.code)).await?;
    tracing::info!("Order {} cancelled", order.base.code);
    Ok(order)
}

pub async fn waive_floor_charge(id: Uuid) -> anyhow::Result<Order> {
    let mut order = load(id).await?;
    let waiver = order.waive_floor_charge().map_err(bad_request)?;
    order.before_write();
    refund_then_save(
        &order,
        waiver.refund,
        &format!("Floor charge waived on order {}", order.base.code),
    )
    .await?;
    tracing::info!(
        "Floor charge of {} waived on order {}",
        format_rupees(waiver.waived),
        order.base.code
    );
    Ok(order)
}

/// Credits `refund` to the customer's wallet, then saves the order. The
/// credit is taken back if the save fails, so the stored order never claims
/// a refund that did not happen.
async fn refund_then_save(order: &Order, refund: Paise, reason: &str) -> anyhow::Result<()> {
    let order_id = order.base.id.value().to_string();
    let reversal_reason = format!("Reversal: {}", reason);
    a009_wallet::service::move_then_persist(
        refund,
        async {
            a009_wallet::service::credit(&order.customer_id, refund, reason, Some(order_id.clone()))
                .await
                .map(|_| ())
        },
        repository::update(order),
        async {
            a009_wallet::service::debit(
                &order.customer_id,
                refund,
                &reversal_reason,
                Some(order_id.clone()),
            )
            .await
            .map(|_| ())
        },
    )
    .await
}

/// Manual settlement of online payments; wallet orders are paid at checkout.
pub async fn update_payment_status(id: Uuid, status: PaymentStatus) -> anyhow::Result<Order> {
    let mut order = load(id).await?;
    if order.payment_method == PaymentMethod::Wallet {
        return Err(bad_request("Wallet payments cannot be changed manually"));
    }
    if order.status == OrderStatus::Cancelled && status == PaymentStatus::Paid {
        return Err(bad_request("Cancelled orders cannot be marked paid"));
    }
    order.payment_status = status;
    order.before_write();
    repository::update(&order).await?;
    Ok(order)
}

pub async fn insert(order: &Order) -> anyhow::Result<Uuid> {
    repository::insert(order).await
}

const CSV_HEADER: [&str; 14] = [
    "code",
    "created_at",
    "customer_id",
    "items",
    "pincode",
    "floor",
    "status",
    "payment_method",
    "payment_status",
    "subtotal",
    "discount",
    "total",
    "delivery_partner_id",
    "delivered_at",
];

pub fn orders_to_csv(orders: &[Order]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for o in orders {
        writer.write_record([
            o.base.code.clone(),
            o.base.metadata.created_at.to_rfc3339(),
            o.customer_id.clone(),
            o.base.description.clone(),
            o.address.pincode.clone(),
            o.address.floor.to_string(),
            o.status.as_str().to_string(),
            o.payment_method.as_str().to_string(),
            o.payment_status.as_str().to_string(),
            format_rupees(o.pricing.subtotal),
            format_rupees(o.pricing.discount),
            format_rupees(o.pricing.total),
            o.delivery_partner_id.clone().unwrap_or_default(),
            o.delivered_at.map(|d| d.to_rfc3339()).unwrap_or_default(),
        ])?;
    }
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

pub async fn export_csv(query: OrderListQuery) -> anyhow::Result<String> {
    let orders = repository::list_filtered(&query).await?;
    tracing::info!("Exporting {} orders", orders.len());
    orders_to_csv(&orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a005_order::aggregate::{DeliveryAddress, OrderItem};
    use contracts::shared::pricing::OrderPricing;

    fn order(name: &str) -> Order {
        Order::new_from_checkout(
            "customer-1".into(),
            vec![OrderItem {
                product_id: "p1".into(),
                product_type: ProductType::Jar20L,
                name: name.into(),
                unit_price: 6000,
                quantity: 2,
                security_deposit_per_unit: None,
                is_one_time_purchase: false,
            }],
            DeliveryAddress {
                line1: "12 MG Road".into(),
                line2: None,
                city: "Bengaluru".into(),
                pincode: "560001".into(),
                floor: 2,
                contact_phone: None,
            },
            OrderPricing {
                subtotal: 12000,
                total: 12000,
                jar_count: 2,
                ..Default::default()
            },
            PaymentMethod::Cod,
            None,
            None,
        )
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(page_bounds(&OrderListQuery::default()), (50, 0));
        let q = OrderListQuery {
            limit: Some(10_000),
            offset: Some(40),
            ..Default::default()
        };
        assert_eq!(page_bounds(&q), (200, 40));
        let q = OrderListQuery {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(page_bounds(&q).0, 1);
    }

    #[test]
    fn test_csv_export_quotes_fields() {
        let csv = orders_to_csv(&[order("Bisleri, 20L")]).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("code,created_at,customer_id"));
        let row = lines.next().unwrap();
        assert!(row.contains("\"Bisleri, 20L x2\""));
        assert!(row.contains("560001,2,pending,cod,pending"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_consumed_stock_groups_by_type() {
        let o = order("Jar");
        assert_eq!(consumed_stock(&o), vec![(ProductType::Jar20L, 2)]);
    }
}
