use serde::{Deserialize, Serialize};

use crate::domain::a003_dark_store::aggregate::PaymentModel;
use crate::shared::money::Paise;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DarkStoreEarningsRequest {
    pub year: i32,
    pub month: u32,
    /// Admins only; owners always see their own store
    pub store_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEarnings {
    /// "YYYY-MM-DD"
    pub date: String,
    pub orders: i64,
    pub jars: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DarkStoreEarningsResponse {
    /// "YYYY-MM"
    pub period: String,
    pub store_id: String,
    pub store_name: String,
    pub payment_model: PaymentModel,
    pub orders: i64,
    pub jars_delivered: i64,
    pub earnings: Paise,
    pub days: Vec<DailyEarnings>,
}

/// Inclusive date range of a month as "YYYY-MM-DD" strings
pub fn month_bounds(year: i32, month: u32) -> (String, String) {
    let days = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0) {
                29
            } else {
                28
            }
        }
        _ => 31,
    };
    (
        format!("{:04}-{:02}-01", year, month),
        format!("{:04}-{:02}-{:02}", year, month, days),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            month_bounds(2024, 2),
            ("2024-02-01".to_string(), "2024-02-29".to_string())
        );
        assert_eq!(month_bounds(2023, 2).1, "2023-02-28");
        assert_eq!(month_bounds(2025, 11).1, "2025-11-30");
    }
}
