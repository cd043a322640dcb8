use chrono::Utc;
use contracts::domain::a008_contact_submission::aggregate::{
    ContactStatus, ContactSubmission, ContactSubmissionId,
};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a008_contact_submission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub status: String,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ContactSubmission {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id)?;

        Ok(ContactSubmission {
            base: BaseAggregate::with_metadata(
                ContactSubmissionId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            name: m.name,
            email: m.email,
            phone: m.phone,
            message: m.message,
            status: ContactStatus::parse(&m.status).map_err(anyhow::Error::msg)?,
        })
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn to_active(c: &ContactSubmission) -> ActiveModel {
    ActiveModel {
        id: Set(c.base.id.value().to_string()),
        code: Set(c.base.code.clone()),
        description: Set(c.base.description.clone()),
        comment: Set(c.base.comment.clone()),
        name: Set(c.name.clone()),
        email: Set(c.email.clone()),
        phone: Set(c.phone.clone()),
        message: Set(c.message.clone()),
        status: Set(c.status.as_str().to_string()),
        is_deleted: Set(c.base.metadata.is_deleted),
        created_at: Set(Some(c.base.metadata.created_at)),
        updated_at: Set(Some(c.base.metadata.updated_at)),
        version: Set(c.base.metadata.version),
    }
}

/// Newest first
pub async fn list_all() -> anyhow::Result<Vec<ContactSubmission>> {
    Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::CreatedAt)
        .all(conn())
        .await?
        .into_iter()
        .map(ContactSubmission::try_from)
        .collect()
}

pub async fn count_by_status(status: ContactStatus) -> anyhow::Result<u64> {
    Ok(Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::Status.eq(status.as_str()))
        .count(conn())
        .await?)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<ContactSubmission>> {
    Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?
        .map(ContactSubmission::try_from)
        .transpose()
}

pub async fn insert(c: &ContactSubmission) -> anyhow::Result<Uuid> {
    to_active(c).insert(conn()).await?;
    Ok(c.base.id.value())
}

pub async fn update(c: &ContactSubmission) -> anyhow::Result<()> {
    let mut active = to_active(c);
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
