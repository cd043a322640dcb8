use anyhow::Result;
use chrono::{NaiveDate, Timelike};
use contracts::dashboards::d401_analytics::dto::{
    AnalyticsRequest, AnalyticsResponse, ProductRevenue, WalletTotals,
};
use contracts::domain::a001_product::aggregate::ProductType;
use contracts::domain::a005_order::aggregate::{Order, OrderStatus, PaymentStatus};
use contracts::shared::money::Paise;
use std::collections::HashMap;

use crate::domain::{a005_order, a009_wallet};
use crate::shared::api_error::bad_request;
use crate::shared::format::to_local;

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|_| bad_request(format!("Invalid date {}, expected YYYY-MM-DD", s)))
        })
        .transpose()
}

fn in_range(order: &Order, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    let day = to_local(order.base.metadata.created_at).date();
    from.map_or(true, |f| day >= f) && to.map_or(true, |t| day <= t)
}

/// Orders per local hour of placement, cancelled ones excluded
pub fn hourly_histogram(orders: &[&Order]) -> Vec<i64> {
    let mut buckets = vec![0i64; 24];
    for order in orders.iter().filter(|o| o.status != OrderStatus::Cancelled) {
        buckets[to_local(order.base.metadata.created_at).hour() as usize] += 1;
    }
    buckets
}

/// Up to three busiest hours, busiest first; ties go to the earlier hour.
pub fn peak_hours(histogram: &[i64]) -> Vec<u32> {
    let mut hours: Vec<(u32, i64)> = histogram
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(hour, count)| (hour as u32, *count))
        .collect();
    hours.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    hours.into_iter().take(3).map(|(hour, _)| hour).collect()
}

/// Customers with two or more orders over customers with at least one
pub fn repeat_customer_rate(orders: &[&Order]) -> f64 {
    let mut per_customer: HashMap<&str, usize> = HashMap::new();
    for order in orders.iter().filter(|o| o.status != OrderStatus::Cancelled) {
        *per_customer.entry(order.customer_id.as_str()).or_default() += 1;
    }
    if per_customer.is_empty() {
        return 0.0;
    }
    let repeat = per_customer.values().filter(|n| **n >= 2).count();
    repeat as f64 / per_customer.len() as f64
}

pub fn revenue_by_product(orders: &[&Order]) -> Vec<ProductRevenue> {
    ProductType::all()
        .iter()
        .map(|t| {
            let items = orders
                .iter()
                .filter(|o| o.is_revenue())
                .flat_map(|o| o.items.iter())
                .filter(|i| i.product_type == *t);
            let (quantity, revenue) = items.fold((0i64, 0i64), |(q, r), i| {
                (q + i64::from(i.quantity), r + i.unit_price * i64::from(i.quantity))
            });
            ProductRevenue {
                product_type: *t,
                quantity,
                revenue,
            }
        })
        .filter(|p| p.quantity > 0)
        .collect()
}

/// Deposits collected on delivered orders that were not refunded
pub fn deposits_held(orders: &[Order]) -> Paise {
    orders
        .iter()
        .filter(|o| o.status == OrderStatus::Delivered && o.payment_status != PaymentStatus::Refunded)
        .map(|o| o.pricing.security_deposit)
        .sum()
}

pub fn wallet_totals(balances: &[(String, Paise)]) -> WalletTotals {
    WalletTotals {
        wallets: balances.len() as i64,
        total_balance: balances.iter().map(|(_, b)| b).sum(),
    }
}

pub fn compute(
    orders: &[Order],
    balances: &[(String, Paise)],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> AnalyticsResponse {
    let selected: Vec<&Order> = orders.iter().filter(|o| in_range(o, from, to)).collect();
    let revenue_orders: Vec<&&Order> = selected.iter().filter(|o| o.is_revenue()).collect();

    let revenue: Paise = revenue_orders.iter().map(|o| o.pricing.total).sum();
    let delivered = revenue_orders.len() as i64;
    let delivery_minutes: Vec<i64> = selected
        .iter()
        .filter_map(|o| o.delivery_minutes())
        .collect();
    let hourly = hourly_histogram(&selected);

    AnalyticsResponse {
        date_from: from.map(|d| d.to_string()),
        date_to: to.map(|d| d.to_string()),
        revenue,
        delivered_orders: delivered,
        average_order_value: if delivered > 0 { revenue / delivered } else { 0 },
        average_delivery_minutes: if delivery_minutes.is_empty() {
            None
        } else {
            Some(delivery_minutes.iter().sum::<i64>() as f64 / delivery_minutes.len() as f64)
        },
        peak_hours: peak_hours(&hourly),
        hourly_orders: hourly,
        repeat_customer_rate: repeat_customer_rate(&selected),
        revenue_by_product: revenue_by_product(&selected),
        deposits_held: deposits_held(orders),
        wallet: wallet_totals(balances),
    }
}

pub async fn get_analytics(request: AnalyticsRequest) -> Result<AnalyticsResponse> {
    let from = parse_date(request.date_from.as_deref())?;
    let to = parse_date(request.date_to.as_deref())?;
    if let (Some(f), Some(t)) = (from, to) {
        if f > t {
            return Err(bad_request("date_from must not be after date_to"));
        }
    }

    let orders = a005_order::service::list_all().await?;
    let balances = a009_wallet::service::balances_by_user().await?;
    Ok(compute(&orders, &balances, from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use contracts::domain::a005_order::aggregate::{DeliveryAddress, OrderItem, PaymentMethod};
    use contracts::shared::pricing::OrderPricing;

    fn order(customer: &str, product_type: ProductType, qty: u32, created_at: DateTime<Utc>) -> Order {
        let unit_price = 5000;
        let mut o = Order::new_from_checkout(
            customer.into(),
            vec![OrderItem {
                product_id: "p".into(),
                product_type,
                name: "Item".into(),
                unit_price,
                quantity: qty,
                security_deposit_per_unit: Some(10000),
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
                subtotal: unit_price * i64::from(qty),
                security_deposit: 10000 * i64::from(qty),
                total: 15000 * i64::from(qty),
                jar_count: qty,
                ..Default::default()
            },
            PaymentMethod::Cod,
            None,
            None,
        );
        o.base.metadata.created_at = created_at;
        o
    }

    fn delivered(mut o: Order, minutes: i64) -> Order {
        let at = o.base.metadata.created_at + Duration::minutes(minutes);
        o.assign("partner", at).unwrap();
        o.mark_delivered(at).unwrap();
        o
    }

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_peak_hours() {
        let mut histogram = vec![0i64; 24];
        histogram[9] = 4;
        histogram[18] = 4;
        histogram[7] = 2;
        histogram[20] = 1;
        assert_eq!(peak_hours(&histogram), vec![9, 18, 7]);
        assert!(peak_hours(&[0; 24]).is_empty());
    }

    #[test]
    fn test_compute() {
        // 03:30Z is 09:00 IST
        let orders = vec![
            delivered(order("a", ProductType::Jar20L, 2, at("2025-03-01T03:30:00Z")), 30),
            delivered(order("a", ProductType::Jar10L, 1, at("2025-03-02T03:30:00Z")), 60),
            order("b", ProductType::Jar20L, 1, at("2025-03-02T12:30:00Z")),
            delivered(order("c", ProductType::Jar20L, 1, at("2025-04-10T03:30:00Z")), 10),
        ];
        let balances = vec![("a".to_string(), 5000), ("b".to_string(), 0)];
        let from = NaiveDate::from_ymd_opt(2025, 3, 1);
        let to = NaiveDate::from_ymd_opt(2025, 3, 31);

        let r = compute(&orders, &balances, from, to);
        assert_eq!(r.delivered_orders, 2);
        assert_eq!(r.revenue, 45000);
        assert_eq!(r.average_order_value, 22500);
        assert_eq!(r.average_delivery_minutes, Some(45.0));
        assert_eq!(r.hourly_orders[9], 2);
        assert_eq!(r.hourly_orders[18], 1);
        assert_eq!(r.peak_hours, vec![9, 18]);
        assert!((r.repeat_customer_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(r.revenue_by_product.len(), 2);
        assert_eq!(r.revenue_by_product[0].product_type, ProductType::Jar20L);
        assert_eq!(r.revenue_by_product[0].revenue, 10000);
        assert_eq!(r.deposits_held, 40000);
        assert_eq!(r.wallet, WalletTotals { wallets: 2, total_balance: 5000 });
        assert_eq!(r.date_from.as_deref(), Some("2025-03-01"));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date(None).unwrap(), None);
        assert_eq!(parse_date(Some("")).unwrap(), None);
        assert!(parse_date(Some("2025-13-01")).is_err());
        assert_eq!(parse_date(Some("2025-01-31")).unwrap(), NaiveDate::from_ymd_opt(2025, 1, 31));
    }
}
