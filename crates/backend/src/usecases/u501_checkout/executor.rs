use anyhow::Result;
use chrono::Utc;
use contracts::domain::a001_product::aggregate::Product;
use contracts::domain::a003_dark_store::aggregate::DarkStore;
use contracts::domain::a004_deliverable_pincode::aggregate::DeliverablePincode;
use contracts::domain::a005_order::aggregate::{
    CartItem, CheckoutRequest, CheckoutResponse, Order, OrderItem, PaymentMethod, PaymentStatus,
    MAX_LINE_QUANTITY,
};
use contracts::shared::money::{format_rupees, Paise};
use contracts::shared::pricing::{self, OrderPricing, PricingInput, PricingLine};
use contracts::shared::validation::normalize_phone;
use contracts::system::site_settings::SiteSettings;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::{
    a001_product, a002_promo_code, a003_dark_store, a004_deliverable_pincode, a005_order,
    a009_wallet,
};
use crate::shared::api_error::bad_request;
use crate::system::site_settings::service as site_settings;

/// Turns a customer's cart into a persisted order.
///
/// Steps: delivery area check, product lookup, promo, pricing, dark store
/// assignment, minimum order check, wallet payment, persistence, promo usage.
/// Not idempotent: every call places a new order.
pub struct CheckoutExecutor;

impl CheckoutExecutor {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, customer_id: &str, request: CheckoutRequest) -> Result<CheckoutResponse> {
        let cart = merge_cart(&request.items).map_err(bad_request)?;
        let mut address = request.address;
        address.pincode = address.pincode.trim().to_string();
        address.contact_phone = address
            .contact_phone
            .filter(|p| !p.trim().is_empty())
            .map(|p| normalize_phone(&p).unwrap_or(p));

        let area = a004_deliverable_pincode::service::find_deliverable(&address.pincode)
            .await?
            .ok_or_else(|| {
                bad_request(format!("Sorry, we do not deliver to {} yet", address.pincode))
            })?;

        let products = load_products(&cart).await?;
        let items = build_items(&cart, &products).map_err(bad_request)?;
        let lines: Vec<PricingLine> = items.iter().map(OrderItem::pricing_line).collect();

        let settings = site_settings::get().await?;
        let subtotal = pricing::subtotal(&lines);
        check_minimum(subtotal, &settings).map_err(bad_request)?;

        let now = Utc::now();
        let promo = match request.promo_code.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(code) => {
                let (promo, discount) =
                    a002_promo_code::service::resolve(code, subtotal, Some(customer_id), now).await??;
                Some((promo, discount))
            }
            None => None,
        };

        let order_pricing = price(&lines, address.floor, &settings, promo.as_ref().map(|(_, d)| *d));
        let dark_store = pick_dark_store(&area).await?;

        let mut order = Order::new_from_checkout(
            customer_id.to_string(),
            items,
            address,
            order_pricing,
            request.payment_method,
            promo.as_ref().map(|(p, _)| p.base.code.clone()),
            dark_store.map(|s| s.base.id.value().to_string()),
        );
        order.validate().map_err(bad_request)?;
        order.before_write();

        let order_id = order.base.id.value().to_string();
        let charge = if order.payment_method == PaymentMethod::Wallet {
            order.payment_status = PaymentStatus::Paid;
            order.pricing.total
        } else {
            0
        };
        let payment_reason = format!("Payment for order {}", order.base.code);
        let reversal_reason = format!("Reversal for failed order {}", order.base.code);
        a009_wallet::service::move_then_persist(
            charge,
            async {
                a009_wallet::service::debit(customer_id, charge, &payment_reason, Some(order_id.clone()))
                    .await
                    .map(|_| ())
            },
            async { a005_order::service::insert(&order).await.map(|_| ()) },
            async {
                a009_wallet::service::credit(customer_id, charge, &reversal_reason, Some(order_id.clone()))
                    .await
                    .map(|_| ())
            },
        )
        .await?;

        // The order already exists; a lost usage count must not fail checkout
        // and invite a duplicate retry.
        if let Some((promo, _)) = &promo {
            if let Err(e) = a002_promo_code::service::record_use(promo.base.id.value()).await {
                tracing::error!(
                    "Order {} placed but usage of promo {} was not recorded: {:#}",
                    order.base.code,
                    promo.base.code,
                    e
                );
            }
        }

        tracing::info!(
            "Order {} placed by {}: {} ({})",
            order.base.code,
            customer_id,
            format_rupees(order.pricing.total),
            order.payment_method.as_str()
        );

        Ok(CheckoutResponse {
            order_id: order.base.id.value().to_string(),
            code: order.base.code,
            pricing: order.pricing,
            payment_status: order.payment_status,
        })
    }
}

impl Default for CheckoutExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Sums quantities of repeated products, keeping first-seen order.
fn merge_cart(items: &[CartItem]) -> Result<Vec<CartItem>, String> {
    if items.is_empty() {
        return Err("Cart is empty".into());
    }
    let mut merged: Vec<CartItem> = Vec::new();
    for item in items {
        if item.quantity == 0 {
            return Err("Quantity must be at least 1".into());
        }
        let too_many = || format!("Quantity cannot exceed {}", MAX_LINE_QUANTITY);
        match merged.iter_mut().find(|m| m.product_id == item.product_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(item.quantity)
                    .filter(|q| *q <= MAX_LINE_QUANTITY)
                    .ok_or_else(too_many)?;
            }
            None if item.quantity > MAX_LINE_QUANTITY => return Err(too_many()),
            None => merged.push(item.clone()),
        }
    }
    Ok(merged)
}

async fn load_products(cart: &[CartItem]) -> Result<HashMap<String, Product>> {
    let mut products = HashMap::new();
    for item in cart {
        let id = Uuid::parse_str(&item.product_id)
            .map_err(|_| bad_request(format!("Invalid product id {}", item.product_id)))?;
        if let Some(product) = a001_product::service::get_by_id(id).await? {
            products.insert(item.product_id.clone(), product);
        }
    }
    Ok(products)
}

fn build_items(cart: &[CartItem], products: &HashMap<String, Product>) -> Result<Vec<OrderItem>, String> {
    cart.iter()
        .map(|item| {
            let product = products
                .get(&item.product_id)
                .ok_or_else(|| format!("Product {} not found", item.product_id))?;
            if !product.is_active {
                return Err(format!("{} is not available right now", product.base.description));
            }
            Ok(OrderItem {
                product_id: item.product_id.clone(),
                product_type: product.product_type,
                name: product.base.description.clone(),
                unit_price: product.price,
                quantity: item.quantity,
                security_deposit_per_unit: product.security_deposit,
                is_one_time_purchase: product.is_one_time_purchase,
            })
        })
        .collect()
}

fn check_minimum(subtotal: Paise, settings: &SiteSettings) -> Result<(), String> {
    if subtotal < settings.min_order_amount {
        return Err(format!(
            "Minimum order amount is {}",
            format_rupees(settings.min_order_amount)
        ));
    }
    Ok(())
}

fn price(lines: &[PricingLine], floor: u32, settings: &SiteSettings, promo_discount: Option<Paise>) -> OrderPricing {
    pricing::calculate(&PricingInput {
        lines,
        floor,
        floor_charge: settings.floor_charge_config(),
        promo_discount,
        partner_commission_per_jar: settings.partner_commission_per_jar,
    })
}

/// The store linked to the pincode wins; otherwise any active store serving it.
async fn pick_dark_store(area: &DeliverablePincode) -> Result<Option<DarkStore>> {
    if let Some(id) = area.dark_store_id.as_deref().and_then(|s| Uuid::parse_str(s).ok()) {
        if let Some(store) = a003_dark_store::service::get_by_id(id).await? {
            if store.is_active {
                return Ok(Some(store));
            }
        }
    }
    let store = a003_dark_store::service::find_serving(area.pincode()).await?;
    if store.is_none() {
        tracing::warn!("No active dark store serves pincode {}", area.pincode());
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_product::aggregate::{ProductDto, ProductType};

    fn product(name: &str, active: bool, one_time: bool) -> Product {
        Product::new_for_insert(&ProductDto {
            id: None,
            code: None,
            description: name.into(),
            product_type: ProductType::Jar20L,
            price: 6000,
            security_deposit: Some(50000),
            is_one_time_purchase: one_time,
            is_active: active,
            image_url: None,
            comment: None,
        })
    }

    fn cart(id: &str, quantity: u32) -> CartItem {
        CartItem {
            product_id: id.into(),
            quantity,
        }
    }

    #[test]
    fn test_merge_cart() {
        assert!(merge_cart(&[]).is_err());
        assert!(merge_cart(&[cart("a", 0)]).is_err());
        let merged = merge_cart(&[cart("a", 1), cart("b", 2), cart("a", 3)]).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].product_id, "a");
        assert_eq!(merged[0].quantity, 4);
    }

    #[test]
    fn test_merge_cart_bounds_quantities() {
        assert!(merge_cart(&[cart("a", u32::MAX), cart("a", 1)])
            .unwrap_err()
            .contains("cannot exceed"));
        assert!(merge_cart(&[cart("a", MAX_LINE_QUANTITY + 1)]).is_err());
        assert!(merge_cart(&[cart("a", MAX_LINE_QUANTITY - 1), cart("a", 2)]).is_err());
        let merged = merge_cart(&[cart("a", MAX_LINE_QUANTITY - 1), cart("a", 1)]).unwrap();
        assert_eq!(merged[0].quantity, MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_build_items_rejects_missing_and_inactive() {
        let mut products = HashMap::new();
        products.insert("a".to_string(), product("Bisleri 20L", true, false));
        products.insert("b".to_string(), product("Kinley 20L", false, false));

        let items = build_items(&[cart("a", 2)], &products).unwrap();
        assert_eq!(items[0].name, "Bisleri 20L");
        assert_eq!(items[0].unit_price, 6000);

        assert!(build_items(&[cart("b", 1)], &products)
            .unwrap_err()
            .contains("not available"));
        assert!(build_items(&[cart("c", 1)], &products)
            .unwrap_err()
            .contains("not found"));
    }

    #[test]
    fn test_reference_cart_pricing() {
        let products = HashMap::from([
            ("a".to_string(), product("Bisleri 20L", true, false)),
            ("b".to_string(), product("Bisleri 20L (buy)", true, true)),
        ]);
        let settings = SiteSettings::default();

        let items = build_items(&[cart("a", 2)], &products).unwrap();
        let lines: Vec<PricingLine> = items.iter().map(OrderItem::pricing_line).collect();
        let p = price(&lines, 3, &settings, Some(5000));
        assert_eq!(p.total, 108500);
        assert_eq!(p.partner_commission, 2000);

        let items = build_items(&[cart("b", 2)], &products).unwrap();
        let lines: Vec<PricingLine> = items.iter().map(OrderItem::pricing_line).collect();
        let p = price(&lines, 3, &settings, Some(5000));
        assert_eq!(p.security_deposit, 0);
        assert_eq!(p.total, 8500);
    }

    #[test]
    fn test_minimum_order_is_subtotal_based() {
        let settings = SiteSettings {
            min_order_amount: 10000,
            ..SiteSettings::default()
        };
        assert!(check_minimum(9999, &settings).is_err());
        assert!(check_minimum(10000, &settings).is_ok());
    }
}
