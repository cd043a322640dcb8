use chrono::Utc;
use contracts::domain::a007_popup::aggregate::{Popup, PopupId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use contracts::system::users::UserRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a007_popup")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub cta_label: Option<String>,
    pub cta_url: Option<String>,
    pub target_role: Option<String>,
    pub starts_at: Option<chrono::DateTime<chrono::Utc>>,
    pub ends_at: Option<chrono::DateTime<chrono::Utc>>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Popup {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id)?;

        Ok(Popup {
            base: BaseAggregate::with_metadata(PopupId(uuid), m.code, m.description, m.comment, metadata),
            content: m.content,
            image_url: m.image_url,
            cta_label: m.cta_label,
            cta_url: m.cta_url,
            target_role: m
                .target_role
                .as_deref()
                .map(UserRole::parse)
                .transpose()
                .map_err(anyhow::Error::msg)?,
            starts_at: m.starts_at,
            ends_at: m.ends_at,
            is_active: m.is_active,
        })
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn to_active(p: &Popup) -> ActiveModel {
    ActiveModel {
        id: Set(p.base.id.value().to_string()),
        code: Set(p.base.code.clone()),
        description: Set(p.base.description.clone()),
        comment: Set(p.base.comment.clone()),
        content: Set(p.content.clone()),
        image_url: Set(p.image_url.clone()),
        cta_label: Set(p.cta_label.clone()),
        cta_url: Set(p.cta_url.clone()),
        target_role: Set(p.target_role.map(|r| r.as_str().to_string())),
        starts_at: Set(p.starts_at),
        ends_at: Set(p.ends_at),
        is_active: Set(p.is_active),
        is_deleted: Set(p.base.metadata.is_deleted),
        created_at: Set(Some(p.base.metadata.created_at)),
        updated_at: Set(Some(p.base.metadata.updated_at)),
        version: Set(p.base.metadata.version),
    }
}

pub async fn list_all() -> anyhow::Result<Vec<Popup>> {
    Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::CreatedAt)
        .all(conn())
        .await?
        .into_iter()
        .map(Popup::try_from)
        .collect()
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Popup>> {
    Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?
        .map(Popup::try_from)
        .transpose()
}

pub async fn insert(p: &Popup) -> anyhow::Result<Uuid> {
    to_active(p).insert(conn()).await?;
    Ok(p.base.id.value())
}

pub async fn update(p: &Popup) -> anyhow::Result<()> {
    let mut active = to_active(p);
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
