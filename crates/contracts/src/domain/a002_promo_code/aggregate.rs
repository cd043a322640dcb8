use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::money::{deserialize_opt_paise, deserialize_paise, format_rupees, Paise};

crate::uuid_aggregate_id!(
    /// Promo code identifier
    PromoCodeId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "percentage" => Ok(DiscountType::Percentage),
            "fixed" => Ok(DiscountType::Fixed),
            other => Err(format!("Unknown discount type: {}", other)),
        }
    }
}

/// Reasons a promo code cannot be applied; the message is shown to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromoError {
    #[error("Promo code not found")]
    NotFound,

    #[error("Promo code is not active")]
    Inactive,

    #[error("Promo code is not valid yet")]
    NotYetValid,

    #[error("Promo code has expired")]
    Expired,

    #[error("Minimum order amount for this code is {}", rupees(.min_order_amount))]
    BelowMinimum { min_order_amount: Paise },

    #[error("Promo code usage limit reached")]
    UsageLimitReached,

    #[error("You have already used this promo code the maximum number of times")]
    PerUserLimitReached,
}

fn rupees(amount: &Paise) -> String {
    format_rupees(*amount)
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Promo code. `base.code` holds the code customers type, upper-cased.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoCode {
    #[serde(flatten)]
    pub base: BaseAggregate<PromoCodeId>,
    pub discount_type: DiscountType,
    /// Percent points for `percentage`, paise for `fixed`
    pub value: i64,
    pub min_order_amount: Paise,
    pub max_discount: Option<Paise>,
    pub usage_limit: Option<i64>,
    pub per_user_limit: Option<i64>,
    pub used_count: i64,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl PromoCode {
    pub fn new_for_insert(dto: &PromoCodeDto) -> Self {
        let mut base = BaseAggregate::new(
            PromoCodeId::new_v4(),
            normalize_code(&dto.code),
            dto.description.clone().unwrap_or_default(),
        );
        base.comment = dto.comment.clone();

        let mut promo = Self {
            base,
            discount_type: dto.discount_type,
            value: 0,
            min_order_amount: 0,
            max_discount: None,
            usage_limit: None,
            per_user_limit: None,
            used_count: 0,
            valid_from: None,
            valid_until: None,
            is_active: true,
        };
        promo.update(dto);
        promo
    }

    pub fn update(&mut self, dto: &PromoCodeDto) {
        self.base.code = normalize_code(&dto.code);
        self.base.description = dto.description.clone().unwrap_or_default();
        self.base.comment = dto.comment.clone();
        self.discount_type = dto.discount_type;
        self.value = dto.value;
        self.min_order_amount = dto.min_order_amount.unwrap_or(0);
        self.max_discount = dto.max_discount;
        self.usage_limit = dto.usage_limit;
        self.per_user_limit = dto.per_user_limit;
        self.valid_from = dto.valid_from;
        self.valid_until = dto.valid_until;
        self.is_active = dto.is_active;
    }

    pub fn validate(&self) -> Result<(), String> {
        let code = &self.base.code;
        if code.len() < 3 || code.len() > 20 {
            return Err("Code must be 3 to 20 characters long".into());
        }
        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err("Code may only contain letters and digits".into());
        }
        match self.discount_type {
            DiscountType::Percentage if !(1..=100).contains(&self.value) => {
                return Err("Percentage must be between 1 and 100".into());
            }
            DiscountType::Fixed if self.value <= 0 => {
                return Err("Fixed discount must be greater than zero".into());
            }
            _ => {}
        }
        if self.min_order_amount < 0 {
            return Err("Minimum order amount cannot be negative".into());
        }
        if matches!(self.max_discount, Some(cap) if cap <= 0) {
            return Err("Maximum discount must be greater than zero".into());
        }
        if matches!(self.usage_limit, Some(n) if n <= 0)
            || matches!(self.per_user_limit, Some(n) if n <= 0)
        {
            return Err("Usage limits must be positive".into());
        }
        if let (Some(from), Some(until)) = (self.valid_from, self.valid_until) {
            if until <= from {
                return Err("Valid-until must be after valid-from".into());
            }
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }

    /// Discount for a given subtotal, capped by `max_discount` and by the subtotal itself.
    pub fn compute_discount(&self, subtotal: Paise) -> Paise {
        if subtotal <= 0 {
            return 0;
        }
        let raw = match self.discount_type {
            DiscountType::Percentage => subtotal * self.value / 100,
            DiscountType::Fixed => self.value,
        };
        let capped = match self.max_discount {
            Some(cap) => raw.min(cap),
            None => raw,
        };
        capped.clamp(0, subtotal)
    }

    /// `uses_by_customer` is the number of non-cancelled orders of this
    /// customer that already carry the code.
    pub fn check_eligibility(
        &self,
        subtotal: Paise,
        uses_by_customer: i64,
        now: DateTime<Utc>,
    ) -> Result<(), PromoError> {
        if !self.is_active || self.base.metadata.is_deleted {
            return Err(PromoError::Inactive);
        }
        if matches!(self.valid_from, Some(from) if now < from) {
            return Err(PromoError::NotYetValid);
        }
        if matches!(self.valid_until, Some(until) if now > until) {
            return Err(PromoError::Expired);
        }
        if subtotal < self.min_order_amount {
            return Err(PromoError::BelowMinimum {
                min_order_amount: self.min_order_amount,
            });
        }
        if matches!(self.usage_limit, Some(limit) if self.used_count >= limit) {
            return Err(PromoError::UsageLimitReached);
        }
        if matches!(self.per_user_limit, Some(limit) if uses_by_customer >= limit) {
            return Err(PromoError::PerUserLimitReached);
        }
        Ok(())
    }

    /// Eligibility check followed by discount computation
    pub fn apply(
        &self,
        subtotal: Paise,
        uses_by_customer: i64,
        now: DateTime<Utc>,
    ) -> Result<Paise, PromoError> {
        self.check_eligibility(subtotal, uses_by_customer, now)?;
        Ok(self.compute_discount(subtotal))
    }
}

impl AggregateRoot for PromoCode {
    type Id = PromoCodeId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a002"
    }

    fn collection_name() -> &'static str {
        "promo_code"
    }

    fn element_name() -> &'static str {
        "Promo code"
    }

    fn list_name() -> &'static str {
        "Promo codes"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoCodeDto {
    pub id: Option<String>,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub value: i64,
    #[serde(default, deserialize_with = "deserialize_opt_paise")]
    pub min_order_amount: Option<Paise>,
    #[serde(default, deserialize_with = "deserialize_opt_paise")]
    pub max_discount: Option<Paise>,
    pub usage_limit: Option<i64>,
    pub per_user_limit: Option<i64>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatePromoRequest {
    pub code: String,
    #[serde(deserialize_with = "deserialize_paise")]
    pub subtotal: Paise,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatePromoResponse {
    pub valid: bool,
    pub code: String,
    pub discount_amount: Paise,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn promo(discount_type: DiscountType, value: i64) -> PromoCode {
        PromoCode::new_for_insert(&PromoCodeDto {
            id: None,
            code: " water10 ".into(),
            description: None,
            discount_type,
            value,
            min_order_amount: Some(10000),
            max_discount: None,
            usage_limit: None,
            per_user_limit: None,
            valid_from: None,
            valid_until: None,
            is_active: true,
            comment: None,
        })
    }

    #[test]
    fn test_code_is_normalized() {
        let p = promo(DiscountType::Fixed, 5000);
        assert_eq!(p.base.code, "WATER10");
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_percentage_with_cap() {
        let mut p = promo(DiscountType::Percentage, 10);
        assert_eq!(p.compute_discount(12345), 1234);
        p.max_discount = Some(1000);
        assert_eq!(p.compute_discount(12345), 1000);
    }

    #[test]
    fn test_fixed_never_exceeds_subtotal() {
        let p = promo(DiscountType::Fixed, 50000);
        assert_eq!(p.compute_discount(12000), 12000);
        assert_eq!(p.compute_discount(0), 0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut p = promo(DiscountType::Percentage, 0);
        assert!(p.validate().is_err());
        p.value = 101;
        assert!(p.validate().is_err());
        p.value = 20;
        p.base.code = "W!".into();
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_eligibility() {
        let now = Utc::now();
        let mut p = promo(DiscountType::Fixed, 5000);

        assert_eq!(
            p.check_eligibility(9999, 0, now),
            Err(PromoError::BelowMinimum {
                min_order_amount: 10000
            })
        );
        assert_eq!(
            p.check_eligibility(9999, 0, now).unwrap_err().to_string(),
            "Minimum order amount for this code is ₹100.00"
        );
        assert_eq!(p.apply(12000, 0, now), Ok(5000));

        p.valid_until = Some(now - Duration::days(1));
        assert_eq!(p.check_eligibility(12000, 0, now), Err(PromoError::Expired));
        p.valid_until = None;

        p.valid_from = Some(now + Duration::hours(1));
        assert_eq!(p.check_eligibility(12000, 0, now), Err(PromoError::NotYetValid));
        p.valid_from = None;

        p.usage_limit = Some(3);
        p.used_count = 3;
        assert_eq!(
            p.check_eligibility(12000, 0, now),
            Err(PromoError::UsageLimitReached)
        );
        p.usage_limit = None;

        p.per_user_limit = Some(1);
        assert_eq!(
            p.check_eligibility(12000, 1, now),
            Err(PromoError::PerUserLimitReached)
        );

        p.is_active = false;
        assert_eq!(p.check_eligibility(12000, 0, now), Err(PromoError::Inactive));
    }
}
