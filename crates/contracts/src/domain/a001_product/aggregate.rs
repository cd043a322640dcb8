use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::money::{deserialize_opt_paise, deserialize_paise, Paise};
use crate::shared::pricing::PricingLine;

crate::uuid_aggregate_id!(
    /// Product identifier
    ProductId
);

// ============================================================================
// Product type
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    #[serde(rename = "20L_jar")]
    Jar20L,
    #[serde(rename = "10L_jar")]
    Jar10L,
    #[serde(rename = "water_dispenser")]
    WaterDispenser,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Jar20L => "20L_jar",
            ProductType::Jar10L => "10L_jar",
            ProductType::WaterDispenser => "water_dispenser",
        }
    }

    /// Returnable containers counted as jars for commissions and stock
    pub fn is_jar(&self) -> bool {
        matches!(self, ProductType::Jar20L | ProductType::Jar10L)
    }

    pub fn all() -> &'static [ProductType] {
        &[
            ProductType::Jar20L,
            ProductType::Jar10L,
            ProductType::WaterDispenser,
        ]
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "20L_jar" => Ok(ProductType::Jar20L),
            "10L_jar" => Ok(ProductType::Jar10L),
            "water_dispenser" => Ok(ProductType::WaterDispenser),
            other => Err(format!("Unknown product type: {}", other)),
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Catalog item. `base.description` is the product name shown to customers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(flatten)]
    pub base: BaseAggregate<ProductId>,
    pub product_type: ProductType,
    pub price: Paise,
    pub security_deposit: Option<Paise>,
    pub is_one_time_purchase: bool,
    pub is_active: bool,
    pub image_url: Option<String>,
}

impl Product {
    pub fn new_for_insert(dto: &ProductDto) -> Self {
        let code = dto
            .code
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| format!("PRD-{}", &ProductId::new_v4().value().simple().to_string()[..8]));
        let mut base = BaseAggregate::new(ProductId::new_v4(), code, dto.description.clone());
        base.comment = dto.comment.clone();

        Self {
            base,
            product_type: dto.product_type,
            price: dto.price,
            security_deposit: dto.security_deposit,
            is_one_time_purchase: dto.is_one_time_purchase,
            is_active: dto.is_active,
            image_url: dto.image_url.clone(),
        }
    }

    pub fn update(&mut self, dto: &ProductDto) {
        if let Some(code) = dto.code.clone().filter(|c| !c.trim().is_empty()) {
            self.base.code = code;
        }
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.product_type = dto.product_type;
        self.price = dto.price;
        self.security_deposit = dto.security_deposit;
        self.is_one_time_purchase = dto.is_one_time_purchase;
        self.is_active = dto.is_active;
        self.image_url = dto.image_url.clone();
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Product name is required".into());
        }
        if self.price <= 0 {
            return Err("Price must be greater than zero".into());
        }
        if let Some(deposit) = self.security_deposit {
            if deposit < 0 {
                return Err("Security deposit cannot be negative".into());
            }
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }

    /// Deposit actually charged per unit (one-time purchases carry none)
    pub fn effective_deposit(&self) -> Paise {
        if self.is_one_time_purchase {
            0
        } else {
            self.security_deposit.unwrap_or(0)
        }
    }

    pub fn pricing_line(&self, quantity: u32) -> PricingLine {
        PricingLine {
            product_type: self.product_type,
            unit_price: self.price,
            quantity,
            security_deposit_per_unit: self.security_deposit,
            is_one_time_purchase: self.is_one_time_purchase,
        }
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

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
        "a001"
    }

    fn collection_name() -> &'static str {
        "product"
    }

    fn element_name() -> &'static str {
        "Product"
    }

    fn list_name() -> &'static str {
        "Products"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub product_type: ProductType,
    #[serde(deserialize_with = "deserialize_paise")]
    pub price: Paise,
    #[serde(default, deserialize_with = "deserialize_opt_paise")]
    pub security_deposit: Option<Paise>,
    #[serde(default)]
    pub is_one_time_purchase: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub image_url: Option<String>,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto() -> ProductDto {
        serde_json::from_value(serde_json::json!({
            "description": "Bisleri 20L",
            "product_type": "20L_jar",
            "price": "6000",
            "security_deposit": 50000
        }))
        .unwrap()
    }

    #[test]
    fn test_dto_defaults() {
        let d = dto();
        assert!(d.is_active);
        assert!(!d.is_one_time_purchase);
        assert_eq!(d.price, 6000);
    }

    #[test]
    fn test_validate() {
        let mut p = Product::new_for_insert(&dto());
        assert!(p.validate().is_ok());
        assert!(p.base.code.starts_with("PRD-"));
        p.price = 0;
        assert!(p.validate().is_err());
        p.price = 6000;
        p.security_deposit = Some(-1);
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_effective_deposit() {
        let mut p = Product::new_for_insert(&dto());
        assert_eq!(p.effective_deposit(), 50000);
        p.is_one_time_purchase = true;
        assert_eq!(p.effective_deposit(), 0);
    }

    #[test]
    fn test_product_type_wire_names() {
        for t in ProductType::all() {
            let json = serde_json::to_string(t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
            assert_eq!(t.as_str().parse::<ProductType>().unwrap(), *t);
        }
    }
}
