use serde::{Deserialize, Serialize};

use crate::domain::a003_dark_store::aggregate::LowStockAlert;
use crate::shared::money::Paise;

/// Order counts by status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCounts {
    pub total: i64,
    pub pending: i64,
    pub assigned: i64,
    pub delivered: i64,
    pub cancelled: i64,
}

/// Response for the admin overview dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminOverviewResponse {
    pub orders: OrderCounts,
    pub today_orders: i64,
    pub today_revenue: Paise,
    /// Delivered orders only, refunded excluded
    pub total_revenue: Paise,
    pub customers: i64,
    pub active_partners: i64,
    pub active_dark_stores: i64,
    pub low_stock: Vec<LowStockAlert>,
    pub new_contact_submissions: i64,
}
