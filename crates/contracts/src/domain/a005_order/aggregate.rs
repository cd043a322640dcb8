use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::a001_product::aggregate::ProductType;
use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::money::Paise;
use crate::shared::pricing::{OrderPricing, PricingLine};
use crate::shared::validation::is_valid_pincode;

crate::uuid_aggregate_id!(
    /// Order identifier
    OrderId
);

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Assigned,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Assigned => "assigned",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "assigned" => Ok(OrderStatus::Assigned),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("Unknown order status: {}", other)),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Assigned -> Assigned is a reassignment to another partner.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Assigned)
                | (Pending, Cancelled)
                | (Assigned, Assigned)
                | (Assigned, Delivered)
                | (Assigned, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cod,
    Online,
    Wallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Online => "online",
            PaymentMethod::Wallet => "wallet",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "cod" => Ok(PaymentMethod::Cod),
            "online" => Ok(PaymentMethod::Online),
            "wallet" => Ok(PaymentMethod::Wallet),
            other => Err(format!("Unknown payment method: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(format!("Unknown payment status: {}", other)),
        }
    }
}

// ============================================================================
// Value objects
// ============================================================================

/// Result of waiving an order's floor charge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorChargeWaiver {
    pub waived: Paise,
    /// Owed back to the customer's wallet
    pub refund: Paise,
}

/// Largest quantity accepted for one product in one order
pub const MAX_LINE_QUANTITY: u32 = 500;

/// Snapshot of a product at the time of ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub product_type: ProductType,
    pub name: String,
    pub unit_price: Paise,
    pub quantity: u32,
    pub security_deposit_per_unit: Option<Paise>,
    pub is_one_time_purchase: bool,
}

impl OrderItem {
    pub fn pricing_line(&self) -> PricingLine {
        PricingLine {
            product_type: self.product_type,
            unit_price: self.unit_price,
            quantity: self.quantity,
            security_deposit_per_unit: self.security_deposit_per_unit,
            is_one_time_purchase: self.is_one_time_purchase,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub pincode: String,
    /// 0 = ground floor
    #[serde(default)]
    pub floor: u32,
    pub contact_phone: Option<String>,
}

// ============================================================================
// Aggregate Root
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(flatten)]
    pub base: BaseAggregate<OrderId>,
    pub customer_id: String,
    pub items: Vec<OrderItem>,
    pub address: DeliveryAddress,
    /// Total units across all lines
    pub quantity: u32,
    /// Unit price of the first line, used by list views
    pub unit_price: Paise,
    #[serde(flatten)]
    pub pricing: OrderPricing,
    pub promo_code: Option<String>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub delivery_partner_id: Option<String>,
    pub dark_store_id: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancel_reason: Option<String>,
}

/// Human-readable order number, e.g. "ORD-20250114-3F2A9C"
pub fn generate_order_code(id: &OrderId, now: DateTime<Utc>) -> String {
    let suffix = id.value().simple().to_string()[..6].to_uppercase();
    format!("ORD-{}-{}", now.format("%Y%m%d"), suffix)
}

impl Order {
    pub fn new_from_checkout(
        customer_id: String,
        items: Vec<OrderItem>,
        address: DeliveryAddress,
        pricing: OrderPricing,
        payment_method: PaymentMethod,
        promo_code: Option<String>,
        dark_store_id: Option<String>,
    ) -> Self {
        let id = OrderId::new_v4();
        let now = Utc::now();
        let code = generate_order_code(&id, now);
        let quantity = items
            .iter()
            .fold(0u32, |acc, i| acc.saturating_add(i.quantity));
        let unit_price = items.first().map(|i| i.unit_price).unwrap_or(0);
        let description = items
            .iter()
            .map(|i| format!("{} x{}", i.name, i.quantity))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            base: BaseAggregate::new(id, code, description),
            customer_id,
            items,
            address,
            quantity,
            unit_price,
            pricing,
            promo_code,
            payment_method,
            payment_status: PaymentStatus::Pending,
            status: OrderStatus::Pending,
            delivery_partner_id: None,
            dark_store_id,
            assigned_at: None,
            delivered_at: None,
            cancelled_at: None,
            cancel_reason: None,
        }
    }

    pub fn pricing_lines(&self) -> Vec<PricingLine> {
        self.items.iter().map(OrderItem::pricing_line).collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.customer_id.trim().is_empty() {
            return Err("Customer is required".into());
        }
        if self.items.is_empty() {
            return Err("Order must contain at least one item".into());
        }
        if self.items.iter().any(|i| i.quantity == 0) {
            return Err("Quantity must be at least 1".into());
        }
        if self.items.iter().any(|i| i.quantity > MAX_LINE_QUANTITY) {
            return Err(format!("Quantity cannot exceed {}", MAX_LINE_QUANTITY));
        }
        if self.address.line1.trim().is_empty() {
            return Err("Delivery address is required".into());
        }
        if !is_valid_pincode(&self.address.pincode) {
            return Err("Pincode must be exactly 6 digits".into());
        }
        if self.pricing.total < 0 {
            return Err("Order total cannot be negative".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }

    fn transition(&mut self, next: OrderStatus) -> Result<(), String> {
        if !self.status.can_transition_to(next) {
            return Err(format!(
                "Cannot change order status from {} to {}",
                self.status.as_str(),
                next.as_str()
            ));
        }
        self.status = next;
        Ok(())
    }

    pub fn assign(&mut self, delivery_partner_id: &str, now: DateTime<Utc>) -> Result<(), String> {
        if delivery_partner_id.trim().is_empty() {
            return Err("Delivery partner is required".into());
        }
        self.transition(OrderStatus::Assigned)?;
        self.delivery_partner_id = Some(delivery_partner_id.to_string());
        self.assigned_at = Some(now);
        Ok(())
    }

    /// Cash-on-delivery orders are settled on delivery.
    pub fn mark_delivered(&mut self, now: DateTime<Utc>) -> Result<(), String> {
        self.transition(OrderStatus::Delivered)?;
        self.delivered_at = Some(now);
        if self.payment_method == PaymentMethod::Cod {
            self.payment_status = PaymentStatus::Paid;
        }
        Ok(())
    }

    /// Returns true when the order had been paid and needs a refund.
    /// Returns the amount to refund: the current total when the order was
    /// paid, 0 otherwise.
    pub fn cancel(&mut self, reason: Option<String>, now: DateTime<Utc>) -> Result<Paise, String> {
        self.transition(OrderStatus::Cancelled)?;
        self.cancelled_at = Some(now);
        self.cancel_reason = reason.filter(|r| !r.trim().is_empty());
        if self.payment_status != PaymentStatus::Paid {
            return Ok(0);
        }
        self.payment_status = PaymentStatus::Refunded;
        Ok(self.pricing.total)
    }

    /// A paid order gets the difference back, so refund plus the later
    /// total always equals what the customer paid.
    pub fn waive_floor_charge(&mut self) -> Result<FloorChargeWaiver, String> {
        if self.status.is_terminal() {
            return Err("Floor charge can only be waived on open orders".into());
        }
        if self.pricing.floor_charge == 0 {
            return Err("Order has no floor charge".into());
        }
        let total_before = self.pricing.total;
        let waived = self.pricing.floor_charge;
        self.pricing.waive_floor_charge();
        let refund = if self.payment_status == PaymentStatus::Paid {
            total_before - self.pricing.total
        } else {
            0
        };
        Ok(FloorChargeWaiver { waived, refund })
    }

    /// Minutes from placement to delivery
    pub fn delivery_minutes(&self) -> Option<i64> {
        self.delivered_at
            .map(|d| (d - self.base.metadata.created_at).num_minutes())
            .filter(|m| *m >= 0)
    }

    /// Revenue recognised for the order (delivered and not refunded)
    pub fn is_revenue(&self) -> bool {
        self.status == OrderStatus::Delivered && self.payment_status != PaymentStatus::Refunded
    }

    pub fn jars_of(&self, product_type: ProductType) -> i64 {
        self.items
            .iter()
            .filter(|i| i.product_type == product_type)
            .map(|i| i64::from(i.quantity))
            .sum()
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

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
        "a005"
    }

    fn collection_name() -> &'static str {
        "order"
    }

    fn element_name() -> &'static str {
        "Order"
    }

    fn list_name() -> &'static str {
        "Orders"
    }
}

// ============================================================================
// Requests / responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CartItem>,
    pub address: DeliveryAddress,
    pub payment_method: PaymentMethod,
    pub promo_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub order_id: String,
    pub code: String,
    pub pricing: OrderPricing,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignOrderRequest {
    pub delivery_partner_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelOrderRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub customer_id: Option<String>,
    pub delivery_partner_id: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub items: Vec<Order>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn order(payment_method: PaymentMethod) -> Order {
        let items = vec![OrderItem {
            product_id: "p1".into(),
            product_type: ProductType::Jar20L,
            name: "Bisleri 20L".into(),
            unit_price: 6000,
            quantity: 2,
            security_deposit_per_unit: Some(50000),
            is_one_time_purchase: false,
        }];
        let pricing = OrderPricing {
            subtotal: 12000,
            security_deposit: 100000,
            floor_charge: 1500,
            discount: 5000,
            total: 108500,
            jar_count: 2,
            partner_commission: 2000,
            ..Default::default()
        };
        Order::new_from_checkout(
            "cust-1".into(),
            items,
            DeliveryAddress {
                line1: "12 MG Road".into(),
                line2: None,
                city: "Bengaluru".into(),
                pincode: "560001".into(),
                floor: 3,
                contact_phone: None,
            },
            pricing,
            payment_method,
            Some("WATER10".into()),
            None,
        )
    }

    #[test]
    fn test_new_order_defaults() {
        let o = order(PaymentMethod::Cod);
        assert_eq!(o.status, OrderStatus::Pending);
        assert_eq!(o.payment_status, PaymentStatus::Pending);
        assert_eq!(o.quantity, 2);
        assert_eq!(o.unit_price, 6000);
        assert!(o.base.code.starts_with("ORD-"));
        assert_eq!(o.base.description, "Bisleri 20L x2");
        assert!(o.validate().is_ok());
    }

    #[test]
    fn test_transitions() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Assigned));
        assert!(Assigned.can_transition_to(Assigned));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
    }

    #[test]
    fn test_lifecycle_cod() {
        let mut o = order(PaymentMethod::Cod);
        let now = Utc::now();
        assert!(o.mark_delivered(now).is_err());
        o.assign("partner-1", now).unwrap();
        assert_eq!(o.status, OrderStatus::Assigned);
        o.mark_delivered(now + Duration::minutes(45)).unwrap();
        assert_eq!(o.payment_status, PaymentStatus::Paid);
        assert!(o.is_revenue());
        assert!(o.cancel(None, now).is_err());
    }

    #[test]
    fn test_cancel_paid_wallet_order_requests_refund() {
        let mut o = order(PaymentMethod::Wallet);
        o.payment_status = PaymentStatus::Paid;
        let refund = o.cancel(Some("changed mind".into()), Utc::now()).unwrap();
        assert_eq!(refund, 108500);
        assert_eq!(o.payment_status, PaymentStatus::Refunded);
        assert_eq!(o.cancel_reason.as_deref(), Some("changed mind"));
    }

    #[test]
    fn test_waive_floor_charge() {
        let mut o = order(PaymentMethod::Cod);
        assert_eq!(
            o.waive_floor_charge(),
            Ok(FloorChargeWaiver {
                waived: 1500,
                refund: 0
            })
        );
        assert_eq!(o.pricing.total, 107000);
        assert!(o.waive_floor_charge().is_err());
    }

    #[test]
    fn test_waive_then_cancel_refunds_everything_paid() {
        let mut o = order(PaymentMethod::Wallet);
        o.payment_status = PaymentStatus::Paid;
        let paid = o.pricing.total;

        let waiver = o.waive_floor_charge().unwrap();
        assert_eq!(waiver.refund, 1500);
        let on_cancel = o.cancel(None, Utc::now()).unwrap();
        assert_eq!(on_cancel, 107000);
        assert_eq!(waiver.refund + on_cancel, paid);
    }

    #[test]
    fn test_cancel_unpaid_order_refunds_nothing() {
        let mut o = order(PaymentMethod::Cod);
        assert_eq!(o.cancel(None, Utc::now()), Ok(0));
        assert_eq!(o.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn test_line_quantity_is_bounded() {
        let mut o = order(PaymentMethod::Cod);
        o.items[0].quantity = MAX_LINE_QUANTITY;
        assert!(o.validate().is_ok());
        o.items[0].quantity = MAX_LINE_QUANTITY + 1;
        assert!(o.validate().is_err());
    }

    #[test]
    fn test_delivery_minutes() {
        let mut o = order(PaymentMethod::Cod);
        let created = o.base.metadata.created_at;
        o.assign("partner-1", created).unwrap();
        o.mark_delivered(created + Duration::minutes(38)).unwrap();
        assert_eq!(o.delivery_minutes(), Some(38));
    }

    #[test]
    fn test_flattened_pricing_on_the_wire() {
        let o = order(PaymentMethod::Online);
        let json = serde_json::to_value(&o).unwrap();
        assert_eq!(json["total"], 108500);
        assert_eq!(json["floor_charge"], 1500);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["payment_method"], "online");
    }
}
