use anyhow::Result;
use chrono::{NaiveDate, Utc};
use contracts::dashboards::d403_partner_earnings::dto::PartnerEarningsResponse;
use contracts::domain::a005_order::aggregate::{Order, OrderStatus};

use crate::domain::a005_order;
use crate::shared::format::to_local;

/// `orders` are the orders assigned to one partner.
pub fn compute(orders: &[Order], today: NaiveDate) -> PartnerEarningsResponse {
    let mut r = PartnerEarningsResponse::default();
    for order in orders {
        match order.status {
            OrderStatus::Assigned => r.pending_assigned += 1,
            OrderStatus::Delivered => {
                r.delivered += 1;
                r.total_commission += order.pricing.partner_commission;
                if matches!(order.delivered_at, Some(at) if to_local(at).date() == today) {
                    r.today_delivered += 1;
                    r.today_commission += order.pricing.partner_commission;
                }
            }
            _ => {}
        }
    }
    r
}

pub async fn get_earnings(partner_id: &str) -> Result<PartnerEarningsResponse> {
    let orders = a005_order::service::list_for_partner(partner_id).await?;
    Ok(compute(&orders, to_local(Utc::now()).date()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use contracts::domain::a001_product::aggregate::ProductType;
    use contracts::domain::a005_order::aggregate::{DeliveryAddress, OrderItem, PaymentMethod};
    use contracts::shared::pricing::OrderPricing;

    fn order(commission: i64) -> Order {
        Order::new_from_checkout(
            "c1".into(),
            vec![OrderItem {
                product_id: "p".into(),
                product_type: ProductType::Jar20L,
                name: "Jar".into(),
                unit_price: 6000,
                quantity: 1,
                security_deposit_per_unit: None,
                is_one_time_purchase: false,
            }],
            DeliveryAddress {
                line1: "1 Main St".into(),
                line2: None,
                city: "Chennai".into(),
                pincode: "600001".into(),
                floor: 0,
                contact_phone: None,
            },
            OrderPricing {
                partner_commission: commission,
                jar_count: 1,
                ..Default::default()
            },
            PaymentMethod::Cod,
            None,
            None,
        )
    }

    #[test]
    fn test_partner_earnings() {
        let now = Utc::now();
        let yesterday = now - Duration::days(1);

        let mut today = order(1000);
        today.assign("p1", now).unwrap();
        today.mark_delivered(now).unwrap();

        let mut earlier = order(2000);
        earlier.assign("p1", yesterday).unwrap();
        earlier.mark_delivered(yesterday).unwrap();

        let mut open = order(3000);
        open.assign("p1", now).unwrap();

        let mut cancelled = order(4000);
        cancelled.assign("p1", now).unwrap();
        cancelled.cancel(None, now).unwrap();

        let r = compute(&[today, earlier, open, cancelled], to_local(now).date());
        assert_eq!(r.delivered, 2);
        assert_eq!(r.today_delivered, 1);
        assert_eq!(r.pending_assigned, 1);
        assert_eq!(r.total_commission, 3000);
        assert_eq!(r.today_commission, 1000);
    }
}
