use chrono::Utc;
use contracts::domain::a005_order::aggregate::{
    Order, OrderId, OrderListQuery, OrderStatus, PaymentMethod, PaymentStatus,
};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use contracts::shared::pricing::OrderPricing;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a005_order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub customer_id: String,
    pub items_json: String,
    pub address_json: String,
    pub pincode: String,
    pub floor: i64,
    pub quantity: i64,
    pub unit_price: i64,
    pub subtotal: i64,
    pub security_deposit: i64,
    pub floor_charge: i64,
    pub floor_charge_waived: i64,
    pub discount: i64,
    pub total: i64,
    pub jar_count: i64,
    pub partner_commission: i64,
    pub promo_code: Option<String>,
    pub payment_method: String,
    pub payment_status: String,
    pub status: String,
    pub delivery_partner_id: Option<String>,
    pub dark_store_id: Option<String>,
    pub assigned_at: Option<chrono::DateTime<chrono::Utc>>,
    pub delivered_at: Option<chrono::DateTime<chrono::Utc>>,
    pub cancelled_at: Option<chrono::DateTime<chrono::Utc>>,
    pub cancel_reason: Option<String>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Order {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id)?;

        Ok(Order {
            base: BaseAggregate::with_metadata(
                OrderId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            customer_id: m.customer_id,
            items: serde_json::from_str(&m.items_json)?,
            address: serde_json::from_str(&m.address_json)?,
            quantity: u32::try_from(m.quantity)?,
            unit_price: m.unit_price,
            pricing: OrderPricing {
                subtotal: m.subtotal,
                security_deposit: m.security_deposit,
                floor_charge: m.floor_charge,
                floor_charge_waived: m.floor_charge_waived,
                discount: m.discount,
                total: m.total,
                jar_count: u32::try_from(m.jar_count)?,
                partner_commission: m.partner_commission,
            },
            promo_code: m.promo_code,
            payment_method: PaymentMethod::parse(&m.payment_method).map_err(anyhow::Error::msg)?,
            payment_status: PaymentStatus::parse(&m.payment_status).map_err(anyhow::Error::msg)?,
            status: OrderStatus::parse(&m.status).map_err(anyhow::Error::msg)?,
            delivery_partner_id: m.delivery_partner_id,
            dark_store_id: m.dark_store_id,
            assigned_at: m.assigned_at,
            delivered_at: m.delivered_at,
            cancelled_at: m.cancelled_at,
            cancel_reason: m.cancel_reason,
        })
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn to_active(order: &Order) -> anyhow::Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(order.base.id.value().to_string()),
        code: Set(order.base.code.clone()),
        description: Set(order.base.description.clone()),
        comment: Set(order.base.comment.clone()),
        customer_id: Set(order.customer_id.clone()),
        items_json: Set(serde_json::to_string(&order.items)?),
        address_json: Set(serde_json::to_string(&order.address)?),
        pincode: Set(order.address.pincode.clone()),
        floor: Set(i64::from(order.address.floor)),
        quantity: Set(i64::from(order.quantity)),
        unit_price: Set(order.unit_price),
        subtotal: Set(order.pricing.subtotal),
        security_deposit: Set(order.pricing.security_deposit),
        floor_charge: Set(order.pricing.floor_charge),
        floor_charge_waived: Set(order.pricing.floor_charge_waived),
        discount: Set(order.pricing.discount),
        total: Set(order.pricing.total),
        jar_count: Set(i64::from(order.pricing.jar_count)),
        partner_commission: Set(order.pricing.partner_commission),
        promo_code: Set(order.promo_code.clone()),
        payment_method: Set(order.payment_method.as_str().to_string()),
        payment_status: Set(order.payment_status.as_str().to_string()),
        status: Set(order.status.as_str().to_string()),
        delivery_partner_id: Set(order.delivery_partner_id.clone()),
        dark_store_id: Set(order.dark_store_id.clone()),
        assigned_at: Set(order.assigned_at),
        delivered_at: Set(order.delivered_at),
        cancelled_at: Set(order.cancelled_at),
        cancel_reason: Set(order.cancel_reason.clone()),
        is_deleted: Set(order.base.metadata.is_deleted),
        created_at: Set(Some(order.base.metadata.created_at)),
        updated_at: Set(Some(order.base.metadata.updated_at)),
        version: Set(order.base.metadata.version),
    })
}

fn into_orders(models: Vec<Model>) -> anyhow::Result<Vec<Order>> {
    models.into_iter().map(Order::try_from).collect()
}

fn filtered(query: &OrderListQuery) -> Select<Entity> {
    let mut select = Entity::find().filter(Column::IsDeleted.eq(false));
    if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(Column::Status.eq(status));
    }
    if let Some(customer) = query.customer_id.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(Column::CustomerId.eq(customer));
    }
    if let Some(partner) = query.delivery_partner_id.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(Column::DeliveryPartnerId.eq(partner));
    }
    select
}

/// One page of orders, newest first, plus the unpaged total.
pub async fn list_page(query: &OrderListQuery, limit: u64, offset: u64) -> anyhow::Result<(Vec<Order>, u64)> {
    let total = filtered(query).count(conn()).await?;
    let models = filtered(query)
        .order_by_desc(Column::CreatedAt)
        .offset(offset)
        .limit(limit)
        .all(conn())
        .await?;
    Ok((into_orders(models)?, total))
}

pub async fn list_filtered(query: &OrderListQuery) -> anyhow::Result<Vec<Order>> {
    let models = filtered(query)
        .order_by_desc(Column::CreatedAt)
        .all(conn())
        .await?;
    into_orders(models)
}

/// Snapshot used by the dashboards
pub async fn list_all() -> anyhow::Result<Vec<Order>> {
    list_filtered(&OrderListQuery::default()).await
}

pub async fn list_by_dark_store(store_id: &str) -> anyhow::Result<Vec<Order>> {
    let models = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::DarkStoreId.eq(store_id))
        .order_by_desc(Column::CreatedAt)
        .all(conn())
        .await?;
    into_orders(models)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Order>> {
    Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?
        .map(Order::try_from)
        .transpose()
}

/// Non-cancelled orders of a customer that carry `code`
pub async fn count_promo_uses(customer_id: &str, code: &str) -> anyhow::Result<i64> {
    let count = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::CustomerId.eq(customer_id))
        .filter(Column::PromoCode.eq(code))
        .filter(Column::Status.ne(OrderStatus::Cancelled.as_str()))
        .count(conn())
        .await?;
    Ok(i64::try_from(count)?)
}

pub async fn insert(order: &Order) -> anyhow::Result<Uuid> {
    to_active(order)?.insert(conn()).await?;
    Ok(order.base.id.value())
}

pub async fn update(order: &Order) -> anyhow::Result<()> {
    let mut active = to_active(order)?;
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(conn()).await?;
    Ok(())
}
