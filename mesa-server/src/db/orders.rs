//! Order rows

use shared::models::{Order, OrderStatus};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

pub async fn insert_order<'e, E: SqliteExecutor<'e>>(
    executor: E,
    order: &Order,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO orders (
            id, tenant_id, table_id, customer_id, waiter_id, status,
            total_amount, created_at, updated_at, completed_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(order.id)
    .bind(&order.tenant_id)
    .bind(order.table_id)
    .bind(order.customer_id)
    .bind(order.waiter_id)
    .bind(order.status)
    .bind(order.total_amount)
    .bind(order.created_at)
    .bind(order.updated_at)
    .bind(order.completed_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Load an order by id regardless of tenant; callers perform the tenant check
pub async fn find_order<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        r#"
        SELECT id, tenant_id, table_id, customer_id, waiter_id, status,
               total_amount, created_at, updated_at, completed_at
        FROM orders
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Tenant's orders, newest first
pub async fn list_orders<'e, E: SqliteExecutor<'e>>(
    executor: E,
    tenant_id: &str,
    status: Option<OrderStatus>,
) -> Result<Vec<Order>, sqlx::Error> {
    let statuses: Vec<OrderStatus> = status.into_iter().collect();
    list_orders_by_statuses(executor, tenant_id, &statuses).await
}

/// Tenant's orders in any of `statuses` (all statuses when empty), newest first
pub async fn list_orders_by_statuses<'e, E: SqliteExecutor<'e>>(
    executor: E,
    tenant_id: &str,
    statuses: &[OrderStatus],
) -> Result<Vec<Order>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
        SELECT id, tenant_id, table_id, customer_id, waiter_id, status,
               total_amount, created_at, updated_at, completed_at
        FROM orders
        WHERE tenant_id = "#,
    );
    qb.push_bind(tenant_id);
    if !statuses.is_empty() {
        qb.push(" AND status IN (");
        let mut sep = qb.separated(", ");
        for status in statuses {
            sep.push_bind(*status);
        }
        sep.push_unseparated(")");
    }
    qb.push(" ORDER BY created_at DESC, id DESC");

    qb.build_query_as::<Order>().fetch_all(executor).await
}

/// Persist the patchable columns of an order, provided its stored status is
/// still `expected`. Returns the number of rows changed. `total_amount` is
/// owned by the item path ([`update_total`]) and never written here.
pub async fn update_order<'e, E: SqliteExecutor<'e>>(
    executor: E,
    order: &Order,
    expected: OrderStatus,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE orders SET
            table_id = ?, waiter_id = ?, status = ?,
            updated_at = ?, completed_at = ?
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(order.table_id)
    .bind(order.waiter_id)
    .bind(order.status)
    .bind(order.updated_at)
    .bind(order.completed_at)
    .bind(order.id)
    .bind(expected)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn update_total<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
    total_amount: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET total_amount = ?, updated_at = ? WHERE id = ?")
        .bind(total_amount)
        .bind(now)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Move an order to `status` only if it is currently `expected`.
/// Returns the number of rows changed (0 when another writer got there first).
pub async fn update_status_if<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
    expected: OrderStatus,
    status: OrderStatus,
    now: i64,
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
            .bind(status)
            .bind(now)
            .bind(id)
            .bind(expected)
            .execute(executor)
            .await?;
    Ok(result.rows_affected())
}

pub async fn delete_order<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
