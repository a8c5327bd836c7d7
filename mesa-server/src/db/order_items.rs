//! Order item rows and their modifier snapshots

use shared::models::{OrderItem, OrderItemModifier, OrderItemStatus};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor};
use std::collections::HashMap;

pub async fn insert_item<'e, E: SqliteExecutor<'e>>(
    executor: E,
    item: &OrderItem,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO order_items (
            id, tenant_id, order_id, dish_id, quantity, unit_price, note,
            status, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(item.id)
    .bind(&item.tenant_id)
    .bind(item.order_id)
    .bind(item.dish_id)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(&item.note)
    .bind(item.status)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_modifier<'e, E: SqliteExecutor<'e>>(
    executor: E,
    modifier: &OrderItemModifier,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO order_item_modifiers (
            id, tenant_id, order_item_id, modifier_id, name, price_delta
        )
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(modifier.id)
    .bind(&modifier.tenant_id)
    .bind(modifier.order_item_id)
    .bind(modifier.modifier_id)
    .bind(&modifier.name)
    .bind(modifier.price_delta)
    .execute(executor)
    .await?;
    Ok(())
}

/// Insert an item together with its modifiers
pub async fn insert_item_with_modifiers(
    conn: &mut SqliteConnection,
    item: &OrderItem,
) -> Result<(), sqlx::Error> {
    insert_item(&mut *conn, item).await?;
    for modifier in &item.modifiers {
        insert_modifier(&mut *conn, modifier).await?;
    }
    Ok(())
}

/// Load one item (with modifiers) by id
pub async fn find_item(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<OrderItem>, sqlx::Error> {
    let item = sqlx::query_as::<_, OrderItem>(
        r#"
        SELECT id, tenant_id, order_id, dish_id, quantity, unit_price, note,
               status, created_at, updated_at
        FROM order_items
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(item) = item else {
        return Ok(None);
    };
    let mut items = vec![item];
    attach_modifiers(conn, &mut items).await?;
    Ok(items.pop())
}

/// All items of one order, in creation order, with modifiers attached
pub async fn list_items_by_order(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> Result<Vec<OrderItem>, sqlx::Error> {
    list_items_by_orders(conn, &[order_id], None).await
}

/// Items of many orders in one batched lookup, optionally filtered by status
pub async fn list_items_by_orders(
    conn: &mut SqliteConnection,
    order_ids: &[i64],
    status: Option<OrderItemStatus>,
) -> Result<Vec<OrderItem>, sqlx::Error> {
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
        SELECT id, tenant_id, order_id, dish_id, quantity, unit_price, note,
               status, created_at, updated_at
        FROM order_items
        WHERE order_id IN ("#,
    );
    let mut sep = qb.separated(", ");
    for id in order_ids {
        sep.push_bind(*id);
    }
    sep.push_unseparated(")");
    if let Some(status) = status {
        qb.push(" AND status = ");
        qb.push_bind(status);
    }
    qb.push(" ORDER BY created_at, id");

    let mut items = qb
        .build_query_as::<OrderItem>()
        .fetch_all(&mut *conn)
        .await?;
    attach_modifiers(conn, &mut items).await?;
    Ok(items)
}

async fn attach_modifiers(
    conn: &mut SqliteConnection,
    items: &mut [OrderItem],
) -> Result<(), sqlx::Error> {
    if items.is_empty() {
        return Ok(());
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
        SELECT id, tenant_id, order_item_id, modifier_id, name, price_delta
        FROM order_item_modifiers
        WHERE order_item_id IN ("#,
    );
    let mut sep = qb.separated(", ");
    for item in items.iter() {
        sep.push_bind(item.id);
    }
    sep.push_unseparated(") ORDER BY id");

    let rows = qb
        .build_query_as::<OrderItemModifier>()
        .fetch_all(&mut *conn)
        .await?;

    let mut by_item: HashMap<i64, Vec<OrderItemModifier>> = HashMap::new();
    for row in rows {
        by_item.entry(row.order_item_id).or_default().push(row);
    }
    for item in items.iter_mut() {
        item.modifiers = by_item.remove(&item.id).unwrap_or_default();
    }
    Ok(())
}

pub async fn update_item_status<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
    status: OrderItemStatus,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE order_items SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Remove every item of an order, modifiers first
pub async fn delete_items_by_order(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> Result<u64, sqlx::Error> {
    sqlx::query(
        r#"
        DELETE FROM order_item_modifiers
        WHERE order_item_id IN (SELECT id FROM order_items WHERE order_id = ?)
        "#,
    )
    .bind(order_id)
    .execute(&mut *conn)
    .await?;

    let result = sqlx::query("DELETE FROM order_items WHERE order_id = ?")
        .bind(order_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
