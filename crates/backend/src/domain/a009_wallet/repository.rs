use chrono::Utc;
use contracts::domain::a009_wallet::aggregate::{
    TransactionKind, WalletTransaction, WalletTransactionId,
};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use contracts::shared::money::Paise;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, EntityTrait, QueryFilter, QueryOrder, Set,
    Statement,
};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a009_wallet_transaction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub user_id: String,
    pub kind: String,
    pub amount: i64,
    pub order_id: Option<String>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for WalletTransaction {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id)?;

        Ok(WalletTransaction {
            base: BaseAggregate::with_metadata(
                WalletTransactionId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            user_id: m.user_id,
            kind: TransactionKind::parse(&m.kind).map_err(anyhow::Error::msg)?,
            amount: m.amount,
            order_id: m.order_id,
        })
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Ledger of one user, newest first
pub async fn list_by_user(user_id: &str) -> anyhow::Result<Vec<WalletTransaction>> {
    Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::CreatedAt)
        .all(conn())
        .await?
        .into_iter()
        .map(WalletTransaction::try_from)
        .collect()
}

pub async fn balance_of(user_id: &str) -> anyhow::Result<Paise> {
    let row = conn()
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT COALESCE(SUM(CASE WHEN kind = 'credit' THEN amount ELSE -amount END), 0) AS balance \
             FROM a009_wallet_transaction WHERE is_deleted = 0 AND user_id = ?",
            [user_id.into()],
        ))
        .await?;
    match row {
        Some(row) => Ok(row.try_get("", "balance")?),
        None => Ok(0),
    }
}

/// Balance of every user with at least one transaction, in one grouped query
pub async fn balances_by_user() -> anyhow::Result<Vec<(String, Paise)>> {
    let rows = conn()
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT user_id, SUM(CASE WHEN kind = 'credit' THEN amount ELSE -amount END) AS balance \
             FROM a009_wallet_transaction WHERE is_deleted = 0 GROUP BY user_id"
                .to_string(),
        ))
        .await?;
    rows.iter()
        .map(|row| -> anyhow::Result<(String, Paise)> {
            Ok((row.try_get("", "user_id")?, row.try_get("", "balance")?))
        })
        .collect()
}

pub async fn insert(tx: &WalletTransaction) -> anyhow::Result<Uuid> {
    let active = ActiveModel {
        id: Set(tx.base.id.value().to_string()),
        code: Set(tx.base.code.clone()),
        description: Set(tx.base.description.clone()),
        comment: Set(tx.base.comment.clone()),
        user_id: Set(tx.user_id.clone()),
        kind: Set(tx.kind.as_str().to_string()),
        amount: Set(tx.amount),
        order_id: Set(tx.order_id.clone()),
        is_deleted: Set(false),
        created_at: Set(Some(tx.base.metadata.created_at)),
        updated_at: Set(Some(tx.base.metadata.updated_at)),
        version: Set(tx.base.metadata.version),
    };
    active.insert(conn()).await?;
    Ok(tx.base.id.value())
}
