use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::a001_product::aggregate::ProductType;
use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::money::{deserialize_opt_paise, Paise};
use crate::shared::validation::{is_valid_email, is_valid_phone, is_valid_pincode};

crate::uuid_aggregate_id!(
    /// Dark store identifier
    DarkStoreId
);

/// How the store owner is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentModel {
    /// Fixed amount per jar fulfilled
    PerJar,
    /// Fixed monthly rent
    Rent,
}

impl PaymentModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentModel::PerJar => "per_jar",
            PaymentModel::Rent => "rent",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "per_jar" => Ok(PaymentModel::PerJar),
            "rent" => Ok(PaymentModel::Rent),
            other => Err(format!("Unknown payment model: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOwner {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    /// Linked `sys_users` account with role dark_store_owner
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub product_type: ProductType,
    pub quantity: i64,
    pub capacity: i64,
    /// Low-stock alert level
    pub threshold: i64,
}

impl StockEntry {
    pub fn is_low(&self) -> bool {
        self.quantity <= self.threshold
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Fulfilment-only micro-warehouse. `base.description` is the store name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DarkStore {
    #[serde(flatten)]
    pub base: BaseAggregate<DarkStoreId>,
    pub owner: StoreOwner,
    pub address: String,
    pub payment_model: PaymentModel,
    pub per_jar_rate: Paise,
    pub monthly_rent: Paise,
    pub pincodes: Vec<String>,
    pub stock: Vec<StockEntry>,
    pub is_active: bool,
}

impl DarkStore {
    pub fn new_for_insert(dto: &DarkStoreDto) -> Self {
        let code = dto
            .code
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| format!("DS-{}", &DarkStoreId::new_v4().value().simple().to_string()[..6]));
        let base = BaseAggregate::new(DarkStoreId::new_v4(), code, dto.description.clone());
        let mut store = Self {
            base,
            owner: dto.owner.clone(),
            address: String::new(),
            payment_model: dto.payment_model,
            per_jar_rate: 0,
            monthly_rent: 0,
            pincodes: Vec::new(),
            stock: Vec::new(),
            is_active: true,
        };
        store.update(dto);
        store
    }

    pub fn update(&mut self, dto: &DarkStoreDto) {
        if let Some(code) = dto.code.clone().filter(|c| !c.trim().is_empty()) {
            self.base.code = code;
        }
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.owner = dto.owner.clone();
        self.address = dto.address.clone();
        self.payment_model = dto.payment_model;
        self.per_jar_rate = dto.per_jar_rate.unwrap_or(0);
        self.monthly_rent = dto.monthly_rent.unwrap_or(0);
        self.pincodes = dto.pincodes.iter().map(|p| p.trim().to_string()).collect();
        if let Some(stock) = &dto.stock {
            self.stock = stock.clone();
        }
        self.is_active = dto.is_active;
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Store name is required".into());
        }
        if self.owner.name.trim().is_empty() {
            return Err("Owner name is required".into());
        }
        if !is_valid_phone(&self.owner.phone) {
            return Err("Owner phone must be a 10-digit number".into());
        }
        if let Some(email) = self.owner.email.as_deref().filter(|e| !e.trim().is_empty()) {
            if !is_valid_email(email) {
                return Err("Owner email is invalid".into());
            }
        }
        if self.address.trim().is_empty() {
            return Err("Address is required".into());
        }
        match self.payment_model {
            PaymentModel::PerJar if self.per_jar_rate <= 0 => {
                return Err("Per-jar rate must be greater than zero".into());
            }
            PaymentModel::Rent if self.monthly_rent <= 0 => {
                return Err("Monthly rent must be greater than zero".into());
            }
            _ => {}
        }

        let mut seen = HashSet::new();
        for pincode in &self.pincodes {
            if !is_valid_pincode(pincode) {
                return Err(format!("Invalid pincode: {}", pincode));
            }
            if !seen.insert(pincode.as_str()) {
                return Err(format!("Duplicate pincode: {}", pincode));
            }
        }

        let mut types = HashSet::new();
        for entry in &self.stock {
            if !types.insert(entry.product_type) {
                return Err(format!("Duplicate stock entry for {}", entry.product_type));
            }
            if entry.quantity < 0 || entry.capacity < 0 || entry.threshold < 0 {
                return Err("Stock values cannot be negative".into());
            }
            if entry.quantity > entry.capacity {
                return Err(format!("Stock of {} exceeds capacity", entry.product_type));
            }
            if entry.threshold > entry.capacity {
                return Err(format!("Threshold of {} exceeds capacity", entry.product_type));
            }
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }

    pub fn serves(&self, pincode: &str) -> bool {
        self.pincodes.iter().any(|p| p == pincode.trim())
    }

    /// Replaces (or adds) the stock entry of one product type.
    pub fn set_stock(&mut self, entry: StockEntry) {
        match self
            .stock
            .iter_mut()
            .find(|e| e.product_type == entry.product_type)
        {
            Some(existing) => *existing = entry,
            None => self.stock.push(entry),
        }
    }

    /// Decrements stock after a delivery; never goes below zero.
    pub fn consume_stock(&mut self, product_type: ProductType, quantity: i64) {
        if let Some(entry) = self
            .stock
            .iter_mut()
            .find(|e| e.product_type == product_type)
        {
            entry.quantity = (entry.quantity - quantity).max(0);
        }
    }

    pub fn low_stock(&self) -> Vec<&StockEntry> {
        self.stock.iter().filter(|e| e.is_low()).collect()
    }

    /// Owner earnings for a period given the jars fulfilled in it.
    pub fn earnings_for(&self, jars_delivered: i64) -> Paise {
        match self.payment_model {
            PaymentModel::PerJar => jars_delivered * self.per_jar_rate,
            PaymentModel::Rent => self.monthly_rent,
        }
    }
}

impl AggregateRoot for DarkStore {
    type Id = DarkStoreId;

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
        "a003"
    }

    fn collection_name() -> &'static str {
        "dark_store"
    }

    fn element_name() -> &'static str {
        "Dark store"
    }

    fn list_name() -> &'static str {
        "Dark stores"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DarkStoreDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub owner: StoreOwner,
    pub address: String,
    pub payment_model: PaymentModel,
    #[serde(default, deserialize_with = "deserialize_opt_paise")]
    pub per_jar_rate: Option<Paise>,
    #[serde(default, deserialize_with = "deserialize_opt_paise")]
    pub monthly_rent: Option<Paise>,
    #[serde(default)]
    pub pincodes: Vec<String>,
    /// `None` keeps the current stock on update
    pub stock: Option<Vec<StockEntry>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub comment: Option<String>,
}

/// Low-stock alert row for dashboards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowStockAlert {
    pub store_id: String,
    pub store_name: String,
    pub product_type: ProductType,
    pub quantity: i64,
    pub threshold: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto() -> DarkStoreDto {
        DarkStoreDto {
            id: None,
            code: None,
            description: "Koramangala hub".into(),
            owner: StoreOwner {
                name: "R. Kumar".into(),
                phone: "9876543210".into(),
                email: Some("kumar@hub.in".into()),
                user_id: None,
            },
            address: "5th Block, Koramangala".into(),
            payment_model: PaymentModel::PerJar,
            per_jar_rate: Some(800),
            monthly_rent: None,
            pincodes: vec!["560034".into(), "560095".into()],
            stock: Some(vec![StockEntry {
                product_type: ProductType::Jar20L,
                quantity: 40,
                capacity: 100,
                threshold: 20,
            }]),
            is_active: true,
            comment: None,
        }
    }

    #[test]
    fn test_valid_store() {
        let s = DarkStore::new_for_insert(&dto());
        assert!(s.validate().is_ok());
        assert!(s.serves("560034"));
        assert!(!s.serves("560001"));
        assert!(s.base.code.starts_with("DS-"));
    }

    #[test]
    fn test_payment_model_requirements() {
        let mut d = dto();
        d.per_jar_rate = None;
        assert!(DarkStore::new_for_insert(&d).validate().is_err());

        d.payment_model = PaymentModel::Rent;
        d.monthly_rent = Some(1_500_000);
        assert!(DarkStore::new_for_insert(&d).validate().is_ok());
    }

    #[test]
    fn test_pincode_and_stock_rules() {
        let mut d = dto();
        d.pincodes = vec!["560034".into(), "560034".into()];
        assert!(DarkStore::new_for_insert(&d).validate().is_err());

        let mut d = dto();
        d.pincodes = vec!["5600".into()];
        assert!(DarkStore::new_for_insert(&d).validate().is_err());

        let mut s = DarkStore::new_for_insert(&dto());
        s.set_stock(StockEntry {
            product_type: ProductType::Jar20L,
            quantity: 120,
            capacity: 100,
            threshold: 20,
        });
        assert_eq!(s.stock.len(), 1);
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_consume_and_low_stock() {
        let mut s = DarkStore::new_for_insert(&dto());
        assert!(s.low_stock().is_empty());
        s.consume_stock(ProductType::Jar20L, 25);
        assert_eq!(s.stock[0].quantity, 15);
        assert_eq!(s.low_stock().len(), 1);
        s.consume_stock(ProductType::Jar20L, 100);
        assert_eq!(s.stock[0].quantity, 0);
        // unknown type is ignored
        s.consume_stock(ProductType::WaterDispenser, 1);
        assert_eq!(s.stock.len(), 1);
    }

    #[test]
    fn test_earnings() {
        let mut s = DarkStore::new_for_insert(&dto());
        assert_eq!(s.earnings_for(30), 24000);
        s.payment_model = PaymentModel::Rent;
        s.monthly_rent = 1_500_000;
        assert_eq!(s.earnings_for(30), 1_500_000);
    }
}
