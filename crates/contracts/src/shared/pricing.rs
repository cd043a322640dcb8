//! Order total / commission calculator.
//!
//! The single place where checkout, the admin order view and the dashboards
//! get subtotal, deposit, floor charge, discount, commission and total from.

use serde::{Deserialize, Serialize};

use super::money::Paise;
use crate::domain::a001_product::aggregate::ProductType;

/// One cart line as seen by the calculator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingLine {
    pub product_type: ProductType,
    pub unit_price: Paise,
    pub quantity: u32,
    pub security_deposit_per_unit: Option<Paise>,
    pub is_one_time_purchase: bool,
}

/// Per-floor surcharge settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorChargeConfig {
    pub enabled: bool,
    pub rate_per_floor: Paise,
}

#[derive(Debug, Clone)]
pub struct PricingInput<'a> {
    pub lines: &'a [PricingLine],
    /// 0 = ground floor
    pub floor: u32,
    pub floor_charge: FloorChargeConfig,
    /// Discount produced by promo validation, already capped by the promo rules
    pub promo_discount: Option<Paise>,
    pub partner_commission_per_jar: Paise,
}

/// Full breakdown of an order's amounts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPricing {
    pub subtotal: Paise,
    pub security_deposit: Paise,
    pub floor_charge: Paise,
    pub floor_charge_waived: Paise,
    pub discount: Paise,
    pub total: Paise,
    pub jar_count: u32,
    pub partner_commission: Paise,
}

impl OrderPricing {
    /// Amount before discount
    pub fn gross(&self) -> Paise {
        self.subtotal + self.security_deposit + self.floor_charge
    }

    /// Moves the floor charge into `floor_charge_waived` and recomputes the total.
    pub fn waive_floor_charge(&mut self) {
        if self.floor_charge == 0 {
            return;
        }
        self.floor_charge_waived += self.floor_charge;
        self.floor_charge = 0;
        self.discount = self.discount.min(self.gross());
        self.total = net_total(self.gross(), self.discount);
    }
}

pub fn subtotal(lines: &[PricingLine]) -> Paise {
    lines
        .iter()
        .map(|l| l.unit_price * i64::from(l.quantity))
        .sum()
}

/// Deposit is never charged for one-time-purchase lines, whatever the configured value.
pub fn security_deposit(lines: &[PricingLine]) -> Paise {
    lines
        .iter()
        .filter(|l| !l.is_one_time_purchase)
        .map(|l| l.security_deposit_per_unit.unwrap_or(0).max(0) * i64::from(l.quantity))
        .sum()
}

/// Charged once per order, only when the cart holds a 20L jar.
pub fn floor_charge(lines: &[PricingLine], floor: u32, config: FloorChargeConfig) -> Paise {
    let has_heavy_jar = lines
        .iter()
        .any(|l| l.product_type == ProductType::Jar20L && l.quantity > 0);
    if config.enabled && has_heavy_jar && floor > 0 {
        i64::from(floor) * config.rate_per_floor.max(0)
    } else {
        0
    }
}

/// Units of returnable jars (20L and 10L)
pub fn jar_count(lines: &[PricingLine]) -> u32 {
    lines
        .iter()
        .filter(|l| l.product_type.is_jar())
        .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
}

fn net_total(gross: Paise, discount: Paise) -> Paise {
    (gross - discount).max(0)
}

pub fn calculate(input: &PricingInput<'_>) -> OrderPricing {
    let subtotal = subtotal(input.lines);
    let security_deposit = security_deposit(input.lines);
    let floor_charge = floor_charge(input.lines, input.floor, input.floor_charge);
    let gross = subtotal + security_deposit + floor_charge;

    let discount = input.promo_discount.unwrap_or(0).max(0).min(gross.max(0));
    let jars = jar_count(input.lines);

    OrderPricing {
        subtotal,
        security_deposit,
        floor_charge,
        floor_charge_waived: 0,
        discount,
        total: net_total(gross, discount),
        jar_count: jars,
        partner_commission: i64::from(jars) * input.partner_commission_per_jar.max(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jar_line(one_time: bool) -> PricingLine {
        PricingLine {
            product_type: ProductType::Jar20L,
            unit_price: 6000,
            quantity: 2,
            security_deposit_per_unit: Some(50000),
            is_one_time_purchase: one_time,
        }
    }

    fn dispenser_line() -> PricingLine {
        PricingLine {
            product_type: ProductType::WaterDispenser,
            unit_price: 45000,
            quantity: 1,
            security_deposit_per_unit: None,
            is_one_time_purchase: true,
        }
    }

    const FLOOR_ON: FloorChargeConfig = FloorChargeConfig {
        enabled: true,
        rate_per_floor: 500,
    };

    fn price(lines: &[PricingLine], floor: u32, promo: Option<Paise>) -> OrderPricing {
        calculate(&PricingInput {
            lines,
            floor,
            floor_charge: FLOOR_ON,
            promo_discount: promo,
            partner_commission_per_jar: 1000,
        })
    }

    #[test]
    fn test_reference_cart() {
        let lines = [jar_line(false)];
        let p = price(&lines, 3, Some(5000));
        assert_eq!(p.subtotal, 12000);
        assert_eq!(p.security_deposit, 100000);
        assert_eq!(p.floor_charge, 1500);
        assert_eq!(p.discount, 5000);
        assert_eq!(p.total, 108500);
        assert_eq!(p.jar_count, 2);
        assert_eq!(p.partner_commission, 2000);
    }

    #[test]
    fn test_one_time_purchase_skips_deposit() {
        let lines = [jar_line(true)];
        let p = price(&lines, 3, Some(5000));
        assert_eq!(p.security_deposit, 0);
        assert_eq!(p.total, 8500);
    }

    #[test]
    fn test_floor_charge_zero_cases() {
        let jars = [jar_line(false)];
        assert_eq!(floor_charge(&jars, 0, FLOOR_ON), 0);
        assert_eq!(
            floor_charge(
                &jars,
                4,
                FloorChargeConfig {
                    enabled: false,
                    rate_per_floor: 500
                }
            ),
            0
        );
        let no_heavy = [
            PricingLine {
                product_type: ProductType::Jar10L,
                ..jar_line(false)
            },
            dispenser_line(),
        ];
        assert_eq!(floor_charge(&no_heavy, 4, FLOOR_ON), 0);
        assert_eq!(floor_charge(&jars, 4, FLOOR_ON), 2000);
    }

    #[test]
    fn test_discount_is_clamped_and_total_never_negative() {
        let carts: Vec<Vec<PricingLine>> = vec![
            vec![],
            vec![jar_line(false)],
            vec![jar_line(true)],
            vec![dispenser_line()],
            vec![jar_line(true), dispenser_line()],
        ];
        for lines in &carts {
            for floor in [0, 1, 7] {
                for promo in [None, Some(0), Some(100), Some(1_000_000_000)] {
                    let p = price(lines, floor, promo);
                    assert!(p.total >= 0);
                    assert!(p.discount <= p.gross());
                    assert_eq!(p.total, p.gross() - p.discount);
                }
            }
        }
    }

    #[test]
    fn test_waive_floor_charge() {
        let lines = [jar_line(false)];
        let mut p = price(&lines, 3, Some(5000));
        p.waive_floor_charge();
        assert_eq!(p.floor_charge, 0);
        assert_eq!(p.floor_charge_waived, 1500);
        assert_eq!(p.total, 107000);

        // second waive is a no-op
        p.waive_floor_charge();
        assert_eq!(p.floor_charge_waived, 1500);
    }

    #[test]
    fn test_jar_count_saturates() {
        let lines = [
            PricingLine {
                quantity: u32::MAX,
                ..jar_line(false)
            },
            jar_line(false),
        ];
        assert_eq!(jar_count(&lines), u32::MAX);
    }

    #[test]
    fn test_negative_deposit_is_ignored() {
        let lines = [PricingLine {
            security_deposit_per_unit: Some(-100),
            ..jar_line(false)
        }];
        assert_eq!(security_deposit(&lines), 0);
    }
}
