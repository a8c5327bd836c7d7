//! Dish catalog lookups (read-only for the order core)
//!
//! Catalog management lives elsewhere; the insert helpers exist for
//! fixtures and tests.

use shared::models::{Dish, DishModifier};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

/// Resolve dishes of a tenant in one batched lookup. Duplicate ids are
/// collapsed; missing or foreign-tenant ids are simply absent from the result.
pub async fn find_dishes<'e, E: SqliteExecutor<'e>>(
    executor: E,
    tenant_id: &str,
    ids: &[i64],
) -> Result<Vec<Dish>, sqlx::Error> {
    let ids = dedup(ids);
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, tenant_id, name, price, is_available FROM dishes WHERE tenant_id = ",
    );
    qb.push_bind(tenant_id);
    qb.push(" AND id IN (");
    let mut sep = qb.separated(", ");
    for id in ids {
        sep.push_bind(id);
    }
    sep.push_unseparated(")");

    qb.build_query_as::<Dish>().fetch_all(executor).await
}

/// Resolve modifier options of a tenant in one batched lookup
pub async fn find_modifiers<'e, E: SqliteExecutor<'e>>(
    executor: E,
    tenant_id: &str,
    ids: &[i64],
) -> Result<Vec<DishModifier>, sqlx::Error> {
    let ids = dedup(ids);
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, tenant_id, dish_id, name, price_delta FROM dish_modifiers WHERE tenant_id = ",
    );
    qb.push_bind(tenant_id);
    qb.push(" AND id IN (");
    let mut sep = qb.separated(", ");
    for id in ids {
        sep.push_bind(id);
    }
    sep.push_unseparated(")");

    qb.build_query_as::<DishModifier>().fetch_all(executor).await
}

pub async fn insert_dish<'e, E: SqliteExecutor<'e>>(
    executor: E,
    dish: &Dish,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO dishes (id, tenant_id, name, price, is_available) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(dish.id)
    .bind(&dish.tenant_id)
    .bind(&dish.name)
    .bind(dish.price)
    .bind(dish.is_available)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_modifier<'e, E: SqliteExecutor<'e>>(
    executor: E,
    modifier: &DishModifier,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO dish_modifiers (id, tenant_id, dish_id, name, price_delta) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(modifier.id)
    .bind(&modifier.tenant_id)
    .bind(modifier.dish_id)
    .bind(&modifier.name)
    .bind(modifier.price_delta)
    .execute(executor)
    .await?;
    Ok(())
}

fn dedup(ids: &[i64]) -> Vec<i64> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}
