use serde::{Deserialize, Serialize};

use crate::shared::money::{deserialize_paise, Paise};
use crate::shared::pricing::FloorChargeConfig;
use crate::shared::validation::{is_valid_email, is_valid_phone};

/// Site-wide settings editable by admins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub floor_charge_enabled: bool,
    #[serde(deserialize_with = "deserialize_paise")]
    pub floor_charge_per_floor: Paise,
    #[serde(deserialize_with = "deserialize_paise")]
    pub partner_commission_per_jar: Paise,
    /// Minimum subtotal accepted at checkout
    #[serde(deserialize_with = "deserialize_paise")]
    pub min_order_amount: Paise,
    pub support_phone: Option<String>,
    pub support_email: Option<String>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            floor_charge_enabled: true,
            floor_charge_per_floor: 500,
            partner_commission_per_jar: 1000,
            min_order_amount: 0,
            support_phone: None,
            support_email: None,
        }
    }
}

impl SiteSettings {
    pub fn floor_charge_config(&self) -> FloorChargeConfig {
        FloorChargeConfig {
            enabled: self.floor_charge_enabled,
            rate_per_floor: self.floor_charge_per_floor,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.floor_charge_per_floor < 0
            || self.partner_commission_per_jar < 0
            || self.min_order_amount < 0
        {
            return Err("Amounts cannot be negative".into());
        }
        if let Some(phone) = self.support_phone.as_deref().filter(|p| !p.is_empty()) {
            if !is_valid_phone(phone) {
                return Err("Support phone must be 10 digits".into());
            }
        }
        if let Some(email) = self.support_email.as_deref().filter(|e| !e.is_empty()) {
            if !is_valid_email(email) {
                return Err("Support email is invalid".into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_string_amounts() {
        let s: SiteSettings = serde_json::from_str(
            r#"{"floor_charge_enabled": true, "floor_charge_per_floor": "500",
                "partner_commission_per_jar": 1000, "min_order_amount": "0",
                "support_phone": null, "support_email": ""}"#,
        )
        .unwrap();
        assert_eq!(s.floor_charge_config().rate_per_floor, 500);
        assert!(s.validate().is_ok());

        let mut bad = SiteSettings::default();
        bad.floor_charge_per_floor = -1;
        assert!(bad.validate().is_err());
    }
}
