use chrono::Utc;
use contracts::domain::a006_notification::aggregate::{
    Notification, NotificationId, NotificationTarget,
};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use contracts::system::users::UserRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a006_notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub message: String,
    pub target: String,
    pub target_role: Option<String>,
    pub target_user_id: Option<String>,
    pub read_by_json: String,
    pub is_active: bool,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Notification {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id)?;
        let target_role = m
            .target_role
            .as_deref()
            .map(UserRole::parse)
            .transpose()
            .map_err(anyhow::Error::msg)?;

        Ok(Notification {
            base: BaseAggregate::with_metadata(
                NotificationId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            message: m.message,
            target: NotificationTarget::parse(&m.target).map_err(anyhow::Error::msg)?,
            target_role,
            target_user_id: m.target_user_id,
            read_by: serde_json::from_str(&m.read_by_json)?,
            is_active: m.is_active,
            expires_at: m.expires_at,
        })
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn to_active(n: &Notification) -> anyhow::Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(n.base.id.value().to_string()),
        code: Set(n.base.code.clone()),
        description: Set(n.base.description.clone()),
        comment: Set(n.base.comment.clone()),
        message: Set(n.message.clone()),
        target: Set(n.target.as_str().to_string()),
        target_role: Set(n.target_role.map(|r| r.as_str().to_string())),
        target_user_id: Set(n.target_user_id.clone()),
        read_by_json: Set(serde_json::to_string(&n.read_by)?),
        is_active: Set(n.is_active),
        expires_at: Set(n.expires_at),
        is_deleted: Set(n.base.metadata.is_deleted),
        created_at: Set(Some(n.base.metadata.created_at)),
        updated_at: Set(Some(n.base.metadata.updated_at)),
        version: Set(n.base.metadata.version),
    })
}

/// Newest first
pub async fn list_all() -> anyhow::Result<Vec<Notification>> {
    Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::CreatedAt)
        .all(conn())
        .await?
        .into_iter()
        .map(Notification::try_from)
        .collect()
}

pub async fn list_active() -> anyhow::Result<Vec<Notification>> {
    Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::IsActive.eq(true))
        .order_by_desc(Column::CreatedAt)
        .all(conn())
        .await?
        .into_iter()
        .map(Notification::try_from)
        .collect()
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Notification>> {
    Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?
        .map(Notification::try_from)
        .transpose()
}

pub async fn insert(n: &Notification) -> anyhow::Result<Uuid> {
    to_active(n)?.insert(conn()).await?;
    Ok(n.base.id.value())
}

pub async fn update(n: &Notification) -> anyhow::Result<()> {
    let mut active = to_active(n)?;
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
