use anyhow::Result;
use chrono::{NaiveDate, Utc};
use contracts::dashboards::d400_admin_overview::dto::{AdminOverviewResponse, OrderCounts};
use contracts::domain::a005_order::aggregate::{Order, OrderStatus};
use contracts::system::users::UserRole;

use crate::domain::{a003_dark_store, a005_order, a008_contact_submission};
use crate::shared::format::to_local;
use crate::system::users::repository as users;

pub fn count_orders(orders: &[Order]) -> OrderCounts {
    let mut counts = OrderCounts {
        total: orders.len() as i64,
        ..Default::default()
    };
    for order in orders {
        match order.status {
            OrderStatus::Pending => counts.pending += 1,
            OrderStatus::Assigned => counts.assigned += 1,
            OrderStatus::Delivered => counts.delivered += 1,
            OrderStatus::Cancelled => counts.cancelled += 1,
        }
    }
    counts
}

/// Order-derived part of the overview
pub fn summarize_orders(orders: &[Order], today: NaiveDate) -> AdminOverviewResponse {
    let placed_today = |o: &&Order| to_local(o.base.metadata.created_at).date() == today;
    let delivered_today =
        |o: &&Order| matches!(o.delivered_at, Some(at) if to_local(at).date() == today);

    AdminOverviewResponse {
        orders: count_orders(orders),
        today_orders: orders.iter().filter(placed_today).count() as i64,
        today_revenue: orders
            .iter()
            .filter(|o| o.is_revenue())
            .filter(delivered_today)
            .map(|o| o.pricing.total)
            .sum(),
        total_revenue: orders
            .iter()
            .filter(|o| o.is_revenue())
            .map(|o| o.pricing.total)
            .sum(),
        ..Default::default()
    }
}

pub async fn get_overview() -> Result<AdminOverviewResponse> {
    let orders = a005_order::service::list_all().await?;
    let stores = a003_dark_store::service::list_all().await?;
    let today = to_local(Utc::now()).date();

    let mut overview = summarize_orders(&orders, today);
    overview.customers = users::count_active_by_role(UserRole::Customer).await?;
    overview.active_partners = users::count_active_by_role(UserRole::DeliveryPartner).await?;
    overview.active_dark_stores = stores.iter().filter(|s| s.is_active).count() as i64;
    overview.low_stock = a003_dark_store::service::low_stock_alerts(&stores);
    overview.new_contact_submissions = a008_contact_submission::service::count_new().await? as i64;
    Ok(overview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};
    use contracts::domain::a001_product::aggregate::ProductType;
    use contracts::domain::a005_order::aggregate::{DeliveryAddress, OrderItem, PaymentMethod};
    use contracts::shared::pricing::OrderPricing;

    fn order(total: i64, created_at: DateTime<Utc>) -> Order {
        let mut o = Order::new_from_checkout(
            "c1".into(),
            vec![OrderItem {
                product_id: "p1".into(),
                product_type: ProductType::Jar20L,
                name: "Jar".into(),
                unit_price: total,
                quantity: 1,
                security_deposit_per_unit: None,
                is_one_time_purchase: false,
            }],
            DeliveryAddress {
                line1: "1 Main St".into(),
                line2: None,
                city: "Pune".into(),
                pincode: "411001".into(),
                floor: 0,
                contact_phone: None,
            },
            OrderPricing {
                subtotal: total,
                total,
                jar_count: 1,
                ..Default::default()
            },
            PaymentMethod::Cod,
            None,
            None,
        );
        o.base.metadata.created_at = created_at;
        o
    }

    #[test]
    fn test_summarize_orders() {
        let now = Utc::now();
        let today = to_local(now).date();
        let old = now - Duration::days(3);

        let mut delivered_today = order(10000, old);
        delivered_today.assign("p1", old).unwrap();
        delivered_today.mark_delivered(now).unwrap();

        let mut delivered_before = order(20000, old);
        delivered_before.assign("p1", old).unwrap();
        delivered_before.mark_delivered(old).unwrap();

        let mut refunded = order(30000, now);
        refunded.payment_status = contracts::domain::a005_order::aggregate::PaymentStatus::Paid;
        refunded.cancel(None, now).unwrap();

        let pending = order(4000, now);

        let summary = summarize_orders(&[delivered_today, delivered_before, refunded, pending], today);
        assert_eq!(summary.orders.total, 4);
        assert_eq!(summary.orders.delivered, 2);
        assert_eq!(summary.orders.cancelled, 1);
        assert_eq!(summary.orders.pending, 1);
        assert_eq!(summary.today_orders, 2);
        assert_eq!(summary.today_revenue, 10000);
        assert_eq!(summary.total_revenue, 30000);
    }
}
