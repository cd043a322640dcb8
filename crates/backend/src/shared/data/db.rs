use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use std::path::Path;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

const META_COLUMNS: &str = "
    is_deleted INTEGER NOT NULL DEFAULT 0,
    created_at TEXT,
    updated_at TEXT,
    version INTEGER NOT NULL DEFAULT 0";

/// Business tables, created on first start. Nested values (order items,
/// dark store stock, pincode lists) live in JSON text columns.
const DOMAIN_TABLES: &[(&str, &str)] = &[
    (
        "a001_product",
        "id TEXT PRIMARY KEY NOT NULL,
         code TEXT NOT NULL DEFAULT '',
         description TEXT NOT NULL,
         comment TEXT,
         product_type TEXT NOT NULL,
         price INTEGER NOT NULL,
         security_deposit INTEGER,
         is_one_time_purchase INTEGER NOT NULL DEFAULT 0,
         is_active INTEGER NOT NULL DEFAULT 1,
         image_url TEXT,",
    ),
    (
        "a002_promo_code",
        "id TEXT PRIMARY KEY NOT NULL,
         code TEXT NOT NULL,
         description TEXT NOT NULL DEFAULT '',
         comment TEXT,
         discount_type TEXT NOT NULL,
         value INTEGER NOT NULL,
         min_order_amount INTEGER NOT NULL DEFAULT 0,
         max_discount INTEGER,
         usage_limit INTEGER,
         per_user_limit INTEGER,
         used_count INTEGER NOT NULL DEFAULT 0,
         valid_from TEXT,
         valid_until TEXT,
         is_active INTEGER NOT NULL DEFAULT 1,",
    ),
    (
        "a003_dark_store",
        "id TEXT PRIMARY KEY NOT NULL,
         code TEXT NOT NULL DEFAULT '',
         description TEXT NOT NULL,
         comment TEXT,
         owner_name TEXT NOT NULL,
         owner_phone TEXT NOT NULL,
         owner_email TEXT,
         owner_user_id TEXT,
         address TEXT NOT NULL,
         payment_model TEXT NOT NULL,
         per_jar_rate INTEGER NOT NULL DEFAULT 0,
         monthly_rent INTEGER NOT NULL DEFAULT 0,
         pincodes_json TEXT NOT NULL DEFAULT '[]',
         stock_json TEXT NOT NULL DEFAULT '[]',
         is_active INTEGER NOT NULL DEFAULT 1,",
    ),
    (
        "a004_deliverable_pincode",
        "id TEXT PRIMARY KEY NOT NULL,
         code TEXT NOT NULL,
         description TEXT NOT NULL,
         comment TEXT,
         city TEXT NOT NULL,
         dark_store_id TEXT,
         is_active INTEGER NOT NULL DEFAULT 1,",
    ),
    (
        "a005_order",
        "id TEXT PRIMARY KEY NOT NULL,
         code TEXT NOT NULL,
         description TEXT NOT NULL DEFAULT '',
         comment TEXT,
         customer_id TEXT NOT NULL,
         items_json TEXT NOT NULL,
         address_json TEXT NOT NULL,
         pincode TEXT NOT NULL,
         floor INTEGER NOT NULL DEFAULT 0,
         quantity INTEGER NOT NULL,
         unit_price INTEGER NOT NULL,
         subtotal INTEGER NOT NULL,
         security_deposit INTEGER NOT NULL DEFAULT 0,
         floor_charge INTEGER NOT NULL DEFAULT 0,
         floor_charge_waived INTEGER NOT NULL DEFAULT 0,
         discount INTEGER NOT NULL DEFAULT 0,
         total INTEGER NOT NULL,
         jar_count INTEGER NOT NULL DEFAULT 0,
         partner_commission INTEGER NOT NULL DEFAULT 0,
         promo_code TEXT,
         payment_method TEXT NOT NULL,
         payment_status TEXT NOT NULL,
         status TEXT NOT NULL,
         delivery_partner_id TEXT,
         dark_store_id TEXT,
         assigned_at TEXT,
         delivered_at TEXT,
         cancelled_at TEXT,
         cancel_reason TEXT,",
    ),
    (
        "a006_notification",
        "id TEXT PRIMARY KEY NOT NULL,
         code TEXT NOT NULL DEFAULT '',
         description TEXT NOT NULL,
         comment TEXT,
         message TEXT NOT NULL,
         target TEXT NOT NULL,
         target_role TEXT,
         target_user_id TEXT,
         read_by_json TEXT NOT NULL DEFAULT '[]',
         is_active INTEGER NOT NULL DEFAULT 1,
         expires_at TEXT,",
    ),
    (
        "a007_popup",
        "id TEXT PRIMARY KEY NOT NULL,
         code TEXT NOT NULL DEFAULT '',
         description TEXT NOT NULL,
         comment TEXT,
         content TEXT NOT NULL DEFAULT '',
         image_url TEXT,
         cta_label TEXT,
         cta_url TEXT,
         target_role TEXT,
         starts_at TEXT,
         ends_at TEXT,
         is_active INTEGER NOT NULL DEFAULT 1,",
    ),
    (
        "a008_contact_submission",
        "id TEXT PRIMARY KEY NOT NULL,
         code TEXT NOT NULL DEFAULT '',
         description TEXT NOT NULL,
         comment TEXT,
         name TEXT NOT NULL,
         email TEXT NOT NULL,
         phone TEXT,
         message TEXT NOT NULL,
         status TEXT NOT NULL DEFAULT 'new',",
    ),
    (
        "a009_wallet_transaction",
        "id TEXT PRIMARY KEY NOT NULL,
         code TEXT NOT NULL DEFAULT '',
         description TEXT NOT NULL,
         comment TEXT,
         user_id TEXT NOT NULL,
         kind TEXT NOT NULL,
         amount INTEGER NOT NULL,
         order_id TEXT,",
    ),
];

const DOMAIN_INDEXES: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_a002_promo_code_code ON a002_promo_code (code) WHERE is_deleted = 0",
    "CREATE INDEX IF NOT EXISTS idx_a004_pincode_code ON a004_deliverable_pincode (code)",
    "CREATE INDEX IF NOT EXISTS idx_a005_order_customer ON a005_order (customer_id)",
    "CREATE INDEX IF NOT EXISTS idx_a005_order_partner ON a005_order (delivery_partner_id)",
    "CREATE INDEX IF NOT EXISTS idx_a005_order_status ON a005_order (status)",
    "CREATE INDEX IF NOT EXISTS idx_a009_wallet_user ON a009_wallet_transaction (user_id)",
];

fn build_sqlite_url(path: &Path) -> String {
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    format!("sqlite://{}{}?mode=rwc", prefix, normalized)
}

async fn table_exists(conn: &DatabaseConnection, table_name: &str) -> anyhow::Result<bool> {
    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type='table' AND name = ?",
            [table_name.into()],
        ))
        .await?;
    Ok(!rows.is_empty())
}

async fn ensure_table(
    conn: &DatabaseConnection,
    table_name: &str,
    columns: &str,
) -> anyhow::Result<()> {
    if table_exists(conn, table_name).await? {
        return Ok(());
    }
    tracing::info!("Creating {} table", table_name);
    let sql = format!("CREATE TABLE {} ({}{});", table_name, columns, META_COLUMNS);
    conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql))
        .await?;
    Ok(())
}

pub async fn initialize_database(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_path.is_absolute() {
        db_path.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_path)
    };
    let db_url = build_sqlite_url(&absolute_path);
    tracing::info!("Opening database {}", absolute_path.display());
    let conn = Database::connect(&db_url).await?;

    for (table_name, columns) in DOMAIN_TABLES {
        ensure_table(&conn, table_name, columns).await?;
    }
    for sql in DOMAIN_INDEXES {
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await?;
    }

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_url() {
        assert_eq!(
            build_sqlite_url(Path::new("/srv/aquaflow/app.db")),
            "sqlite:///srv/aquaflow/app.db?mode=rwc"
        );
        assert_eq!(
            build_sqlite_url(Path::new("C:\\data\\app.db")),
            "sqlite:///C:/data/app.db?mode=rwc"
        );
    }

    #[test]
    fn test_every_table_has_an_id_column() {
        for (name, columns) in DOMAIN_TABLES {
            assert!(columns.trim_start().starts_with("id TEXT PRIMARY KEY"), "{}", name);
            assert!(columns.trim_end().ends_with(','), "{}", name);
        }
    }
}
