//! Database access for restock-import
//!
//! SQLite-backed catalog storage. Entity tables carry UNIQUE constraints on
//! their natural keys, so the store itself rejects the duplicates the
//! engine is designed never to create.

pub mod catalog;

pub use catalog::SqliteCatalog;

use restock_common::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize the catalog database connection pool
pub async fn init_catalog_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    init_tables(&pool).await?;

    Ok(pool)
}

/// Create catalog tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS suppliers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS parts (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            UNIQUE(name, description)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS supplier_parts (
            id TEXT PRIMARY KEY,
            part_id TEXT NOT NULL REFERENCES parts(id),
            supplier_id TEXT NOT NULL REFERENCES suppliers(id),
            sku TEXT NOT NULL,
            link TEXT NOT NULL,
            UNIQUE(supplier_id, sku)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS purchase_orders (
            id TEXT PRIMARY KEY,
            supplier_id TEXT NOT NULL REFERENCES suppliers(id),
            reference TEXT NOT NULL,
            state TEXT NOT NULL DEFAULT 'DRAFT',
            issue_date TEXT,
            complete_date TEXT,
            UNIQUE(supplier_id, reference)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS order_lines (
            id TEXT PRIMARY KEY,
            order_id TEXT NOT NULL REFERENCES purchase_orders(id),
            supplier_part_id TEXT NOT NULL REFERENCES supplier_parts(id),
            quantity INTEGER NOT NULL,
            currency TEXT NOT NULL,
            unit_price TEXT NOT NULL,
            state TEXT NOT NULL DEFAULT 'PENDING'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stock_receipts (
            id TEXT PRIMARY KEY,
            line_item_id TEXT NOT NULL REFERENCES order_lines(id),
            location TEXT,
            quantity INTEGER NOT NULL,
            received_by TEXT NOT NULL,
            received_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Catalog tables initialized");
    Ok(())
}
