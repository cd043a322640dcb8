use chrono::Utc;
use contracts::domain::a003_dark_store::aggregate::{
    DarkStore, DarkStoreId, PaymentModel, StoreOwner,
};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_dark_store")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub owner_name: String,
    pub owner_phone: String,
    pub owner_email: Option<String>,
    pub owner_user_id: Option<String>,
    pub address: String,
    pub payment_model: String,
    pub per_jar_rate: i64,
    pub monthly_rent: i64,
    pub pincodes_json: String,
    pub stock_json: String,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for DarkStore {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id)?;

        Ok(DarkStore {
            base: BaseAggregate::with_metadata(
                DarkStoreId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            owner: StoreOwner {
                name: m.owner_name,
                phone: m.owner_phone,
                email: m.owner_email,
                user_id: m.owner_user_id,
            },
            address: m.address,
            payment_model: PaymentModel::parse(&m.payment_model).map_err(anyhow::Error::msg)?,
            per_jar_rate: m.per_jar_rate,
            monthly_rent: m.monthly_rent,
            pincodes: serde_json::from_str(&m.pincodes_json)?,
            stock: serde_json::from_str(&m.stock_json)?,
            is_active: m.is_active,
        })
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn to_active(aggregate: &DarkStore) -> anyhow::Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        owner_name: Set(aggregate.owner.name.clone()),
        owner_phone: Set(aggregate.owner.phone.clone()),
        owner_email: Set(aggregate.owner.email.clone()),
        owner_user_id: Set(aggregate.owner.user_id.clone()),
        address: Set(aggregate.address.clone()),
        payment_model: Set(aggregate.payment_model.as_str().to_string()),
        per_jar_rate: Set(aggregate.per_jar_rate),
        monthly_rent: Set(aggregate.monthly_rent),
        pincodes_json: Set(serde_json::to_string(&aggregate.pincodes)?),
        stock_json: Set(serde_json::to_string(&aggregate.stock)?),
        is_active: Set(aggregate.is_active),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    })
}

pub async fn list_all() -> anyhow::Result<Vec<DarkStore>> {
    let mut items = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .all(conn())
        .await?
        .into_iter()
        .map(DarkStore::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?;
    items.sort_by(|a, b| {
        a.base
            .description
            .to_lowercase()
            .cmp(&b.base.description.to_lowercase())
    });
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<DarkStore>> {
    Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?
        .map(DarkStore::try_from)
        .transpose()
}

pub async fn get_by_owner(user_id: &str) -> anyhow::Result<Option<DarkStore>> {
    Entity::find()
        .filter(Column::OwnerUserId.eq(user_id))
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?
        .map(DarkStore::try_from)
        .transpose()
}

pub async fn insert(aggregate: &DarkStore) -> anyhow::Result<Uuid> {
    to_active(aggregate)?.insert(conn()).await?;
    Ok(aggregate.base.id.value())
}

pub async fn update(aggregate: &DarkStore) -> anyhow::Result<()> {
    let mut active = to_active(aggregate)?;
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(conn()).await?;
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
