//! Dining table lookups (read-only for the order core)

use shared::models::DiningTable;
use sqlx::SqliteExecutor;

/// Find a table of a tenant. Foreign-tenant tables resolve to `None`.
pub async fn find_table<'e, E: SqliteExecutor<'e>>(
    executor: E,
    tenant_id: &str,
    id: i64,
) -> Result<Option<DiningTable>, sqlx::Error> {
    sqlx::query_as::<_, DiningTable>(
        "SELECT id, tenant_id, name, status FROM dining_tables WHERE id = ? AND tenant_id = ?",
    )
    .bind(id)
    .bind(tenant_id)
    .fetch_optional(executor)
    .await
}

pub async fn insert_table<'e, E: SqliteExecutor<'e>>(
    executor: E,
    table: &DiningTable,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO dining_tables (id, tenant_id, name, status) VALUES (?, ?, ?, ?)")
        .bind(table.id)
        .bind(&table.tenant_id)
        .bind(&table.name)
        .bind(table.status)
        .execute(executor)
        .await?;
    Ok(())
}
