use serde::{Deserialize, Serialize};

use crate::domain::a001_product::aggregate::ProductType;
use crate::shared::money::Paise;

/// Query for the analytics dashboard; dates are "YYYY-MM-DD", both inclusive
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsRequest {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRevenue {
    pub product_type: ProductType,
    pub quantity: i64,
    pub revenue: Paise,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletTotals {
    pub wallets: i64,
    pub total_balance: Paise,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub revenue: Paise,
    pub delivered_orders: i64,
    pub average_order_value: Paise,
    /// Minutes from creation to delivery
    pub average_delivery_minutes: Option<f64>,
    /// Orders per hour of day (IST), index = hour
    pub hourly_orders: Vec<i64>,
    pub peak_hours: Vec<u32>,
    /// Share of customers with two or more orders, 0..=1
    pub repeat_customer_rate: f64,
    pub revenue_by_product: Vec<ProductRevenue>,
    pub deposits_held: Paise,
    pub wallet: WalletTotals,
}
