use chrono::Utc;
use contracts::domain::a002_promo_code::aggregate::{DiscountType, PromoCode, PromoCodeId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_promo_code")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub discount_type: String,
    pub value: i64,
    pub min_order_amount: i64,
    pub max_discount: Option<i64>,
    pub usage_limit: Option<i64>,
    pub per_user_limit: Option<i64>,
    pub used_count: i64,
    pub valid_from: Option<chrono::DateTime<chrono::Utc>>,
    pub valid_until: Option<chrono::DateTime<chrono::Utc>>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for PromoCode {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id)?;

        Ok(PromoCode {
            base: BaseAggregate::with_metadata(
                PromoCodeId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            discount_type: DiscountType::parse(&m.discount_type).map_err(anyhow::Error::msg)?,
            value: m.value,
            min_order_amount: m.min_order_amount,
            max_discount: m.max_discount,
            usage_limit: m.usage_limit,
            per_user_limit: m.per_user_limit,
            used_count: m.used_count,
            valid_from: m.valid_from,
            valid_until: m.valid_until,
            is_active: m.is_active,
        })
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn to_active(aggregate: &PromoCode) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        discount_type: Set(aggregate.discount_type.as_str().to_string()),
        value: Set(aggregate.value),
        min_order_amount: Set(aggregate.min_order_amount),
        max_discount: Set(aggregate.max_discount),
        usage_limit: Set(aggregate.usage_limit),
        per_user_limit: Set(aggregate.per_user_limit),
        used_count: Set(aggregate.used_count),
        valid_from: Set(aggregate.valid_from),
        valid_until: Set(aggregate.valid_until),
        is_active: Set(aggregate.is_active),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    }
}

pub async fn list_all() -> anyhow::Result<Vec<PromoCode>> {
    let mut items = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .all(conn())
        .await?
        .into_iter()
        .map(PromoCode::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?;
    items.sort_by(|a, b| a.base.code.cmp(&b.base.code));
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<PromoCode>> {
    Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?
        .map(PromoCode::try_from)
        .transpose()
}

/// `code` must already be normalized
pub async fn get_by_code(code: &str) -> anyhow::Result<Option<PromoCode>> {
    Entity::find()
        .filter(Column::Code.eq(code))
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?
        .map(PromoCode::try_from)
        .transpose()
}

pub async fn insert(aggregate: &PromoCode) -> anyhow::Result<Uuid> {
    to_active(aggregate).insert(conn()).await?;
    Ok(aggregate.base.id.value())
}

pub async fn update(aggregate: &PromoCode) -> anyhow::Result<()> {
    let mut active = to_active(aggregate);
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(conn()).await?;
    Ok(())
}

/// Atomic `used_count + 1`; a concurrent checkout cannot lose an increment.
pub async fn increment_used_count(id: Uuid) -> anyhow::Result<()> {
    use sea_orm::sea_query::Expr;
    Entity::update_many()
        .col_expr(Column::UsedCount, Expr::col(Column::UsedCount).add(1))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .exec(conn())
        .await?;
    Ok(())
}

pub async fn soft_delete(id: Uuid) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}
