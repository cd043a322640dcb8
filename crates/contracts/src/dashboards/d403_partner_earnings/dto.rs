use serde::{Deserialize, Serialize};

use crate::shared::money::Paise;

/// Response for the delivery partner dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerEarningsResponse {
    pub delivered: i64,
    pub today_delivered: i64,
    pub pending_assigned: i64,
    pub total_commission: Paise,
    pub today_commission: Paise,
}
